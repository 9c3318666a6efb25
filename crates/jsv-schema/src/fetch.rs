//! Schema retrieval from `file:` and `http(s):` origins.
//!
//! One attempt per call, full body accumulated before returning. Retry
//! policy belongs to callers; this layer only distinguishes transport
//! failures from bad HTTP statuses so callers can make that decision.

use reqwest::Client;

use crate::error::SchemaError;
use crate::resolver::Origin;

/// Fetches raw schema bytes from an [`Origin`].
#[derive(Debug, Clone)]
pub struct SchemaFetcher {
    http: Client,
}

impl SchemaFetcher {
    /// Create a fetcher using the given HTTP client. Timeouts are whatever
    /// the client was built with; no application-level deadline is added.
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Retrieve the raw bytes of the schema at `origin`.
    ///
    /// `file:` origins are read directly from disk. `http(s):` origins get
    /// a single GET; a non-2xx response is [`SchemaError::HttpStatus`] and
    /// transport failures (refused connection, timeout, DNS) are
    /// [`SchemaError::Http`].
    pub async fn fetch(&self, origin: &Origin) -> Result<Vec<u8>, SchemaError> {
        match origin {
            Origin::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| SchemaError::LocalRead {
                        path: path.clone(),
                        source: e,
                    })
            }
            Origin::Http(url) => {
                let uri = url.as_str().to_string();
                tracing::debug!(%uri, "fetching schema from origin");

                let resp = self
                    .http
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| SchemaError::Http {
                        uri: uri.clone(),
                        source: e,
                    })?;

                let status = resp.status();
                if !status.is_success() {
                    return Err(SchemaError::HttpStatus {
                        uri,
                        status: status.as_u16(),
                    });
                }

                let body = resp.bytes().await.map_err(|e| SchemaError::Http {
                    uri,
                    source: e,
                })?;
                Ok(body.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn file_origin_reads_local_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, br#"{"type":"object"}"#).unwrap();

        let fetcher = SchemaFetcher::new(Client::new());
        let bytes = fetcher.fetch(&Origin::File(path)).await.unwrap();
        assert_eq!(bytes, br#"{"type":"object"}"#);
    }

    #[tokio::test]
    async fn missing_local_file_is_a_fetch_error() {
        let fetcher = SchemaFetcher::new(Client::new());
        let err = fetcher
            .fetch(&Origin::File(PathBuf::from("/nonexistent/schema.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::LocalRead { .. }), "got: {err}");
        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn refused_connection_is_a_fetch_error() {
        let fetcher = SchemaFetcher::new(Client::new());
        let url = url::Url::parse("http://127.0.0.1:1/schema.json").unwrap();
        let err = fetcher.fetch(&Origin::Http(url)).await.unwrap_err();
        assert!(matches!(err, SchemaError::Http { .. }), "got: {err}");
        assert!(err.is_fetch_error());
    }
}
