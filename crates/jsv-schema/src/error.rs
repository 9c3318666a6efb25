//! Infrastructure error types for schema resolution, fetching, and caching.
//!
//! These errors mean "could not determine an answer" — a schema could not
//! be located, fetched, cached, or parsed. They are deliberately distinct
//! from [`ValidationError`](crate::validate::ValidationError), which means
//! "the answer is no": the document was checked and does not conform.
//! Callers must be able to tell an unreachable schema host apart from an
//! invalid document.

use std::path::PathBuf;

/// Error during schema acquisition (resolve, fetch, cache, parse).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema URI could not be parsed, uses an unsupported scheme,
    /// or resolves to a cache path outside the cache root.
    #[error("malformed schema URI '{uri}': {reason}")]
    MalformedUri {
        /// The offending URI as given by the caller.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// HTTP transport failure while fetching a schema (connection refused,
    /// timeout, DNS). Not retried at this layer.
    #[error("fetch failed for '{uri}': {source}")]
    Http {
        /// The schema URI being fetched.
        uri: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// The schema origin answered with a non-2xx status.
    #[error("fetch of '{uri}' returned HTTP {status}")]
    HttpStatus {
        /// The schema URI being fetched.
        uri: String,
        /// HTTP status code from the origin.
        status: u16,
    },

    /// A `file:` schema could not be read from the local filesystem.
    #[error("cannot read local schema '{path}': {source}")]
    LocalRead {
        /// Path derived from the `file:` URI.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Filesystem error while talking to the schema cache (stat or read).
    ///
    /// Cache *write* failures never surface through this variant to
    /// callers of `acquire` — a failed persist is logged and acquisition
    /// continues from the in-memory bytes.
    #[error("cache I/O error at '{path}': {source}")]
    CacheIo {
        /// Cache file involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Cached or freshly fetched schema bytes are not valid JSON. On the
    /// cache-read path this signals cache corruption and is fatal.
    #[error("schema at '{location}' is not valid JSON: {source}")]
    Parse {
        /// URI or cache path of the unparseable bytes.
        location: String,
        /// Underlying JSON parse error.
        source: serde_json::Error,
    },
}

impl SchemaError {
    /// True for failures of the fetch step itself (network, HTTP status,
    /// unreadable `file:` source), as opposed to cache or parse failures.
    /// Callers deciding on retry policy key off this.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            SchemaError::Http { .. }
                | SchemaError::HttpStatus { .. }
                | SchemaError::LocalRead { .. }
        )
    }
}
