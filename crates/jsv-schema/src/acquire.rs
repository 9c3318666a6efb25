//! Schema acquisition: cache check, fetch on miss, atomic persist, parse.
//!
//! The acquisition sequence for one call is strictly ordered — stat, then
//! fetch, then cache write, then parse — and short-circuits on the first
//! failure with one deliberate exception: a failed cache *write* after a
//! successful fetch is logged and the schema is parsed from the in-memory
//! bytes instead. A full disk or read-only cache must not block validation
//! while the authoritative origin is still reachable.
//!
//! Concurrent first-time acquisitions for the same cache key are coalesced
//! through a per-key guard: the first caller fetches and persists, later
//! callers wait, re-check the cache, and read the freshly written file.
//! `file:` origins skip all of this — the source is already local, so the
//! bytes are read and parsed directly and nothing is ever cached.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::cache::SchemaCache;
use crate::error::SchemaError;
use crate::fetch::SchemaFetcher;
use crate::resolver::{self, Origin};

/// A parsed schema document together with the subschema selector derived
/// from the URI fragment.
#[derive(Debug, Clone)]
pub struct AcquiredSchema {
    /// The full schema document.
    pub schema: Value,
    /// Dotted path scoping validation to a nested definition, if the URI
    /// carried a fragment.
    pub selector: Option<String>,
}

/// Orchestrates URI resolution, cache lookup, fetching, and persistence.
#[derive(Debug)]
pub struct SchemaAcquirer {
    cache: SchemaCache,
    fetcher: SchemaFetcher,
    /// Per-cache-key guards serializing concurrent first-time fetches.
    in_flight: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl SchemaAcquirer {
    /// Create an acquirer over the given cache and fetcher.
    pub fn new(cache: SchemaCache, fetcher: SchemaFetcher) -> Self {
        Self {
            cache,
            fetcher,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Resolve `uri` and return its parsed schema document plus selector.
    ///
    /// Remote schemas are fetched at most once per distinct (host, path)
    /// pair and persisted under the cache root; subsequent acquisitions
    /// read from disk. Fetch failures propagate as hard errors; cache
    /// persist failures degrade to an uncached-but-successful acquisition.
    pub async fn acquire(&self, uri: &str) -> Result<AcquiredSchema, SchemaError> {
        let resolved = resolver::resolve(uri)?;

        match &resolved.origin {
            Origin::File(_) => {
                // Already local — nothing to cache.
                let bytes = self.fetcher.fetch(&resolved.origin).await?;
                let schema = parse_schema(uri, &bytes)?;
                Ok(AcquiredSchema {
                    schema,
                    selector: resolved.selector,
                })
            }
            Origin::Http(_) => {
                let Some(rel) = resolved.cache_path.as_deref() else {
                    // Resolution always derives a cache path for http
                    // origins; without one, serve uncached.
                    let bytes = self.fetcher.fetch(&resolved.origin).await?;
                    let schema = parse_schema(uri, &bytes)?;
                    return Ok(AcquiredSchema {
                        schema,
                        selector: resolved.selector,
                    });
                };

                if self.cache.exists(rel).await? {
                    tracing::debug!(uri, cache_file = %rel.display(), "schema cache hit");
                    let schema = self.cache.read(rel).await?;
                    return Ok(AcquiredSchema {
                        schema,
                        selector: resolved.selector,
                    });
                }

                let guard = self.key_guard(rel.to_path_buf()).await;
                let result = self.fetch_and_persist(uri, &resolved.origin, rel, &guard).await;

                // The entry has served its purpose once this acquisition
                // settles; waiters still holding the Arc finish on their
                // clone, and the next distinct miss gets a fresh guard.
                self.in_flight.lock().await.remove(rel);

                Ok(AcquiredSchema {
                    schema: result?,
                    selector: resolved.selector,
                })
            }
        }
    }

    /// Cache-miss path, serialized per cache key by `guard`.
    async fn fetch_and_persist(
        &self,
        uri: &str,
        origin: &Origin,
        rel: &std::path::Path,
        guard: &Mutex<()>,
    ) -> Result<Value, SchemaError> {
        let _held = guard.lock().await;

        // A coalesced acquisition may have filled the cache while this
        // caller waited for the guard.
        if self.cache.exists(rel).await? {
            return self.cache.read(rel).await;
        }

        let bytes = self.fetcher.fetch(origin).await?;
        if let Err(e) = self.cache.write(rel, &bytes).await {
            tracing::warn!(
                uri,
                cache_file = %rel.display(),
                "failed to persist fetched schema, continuing uncached: {e}"
            );
        }
        parse_schema(uri, &bytes)
    }

    /// Get or create the in-flight guard for a cache key.
    async fn key_guard(&self, key: PathBuf) -> Arc<Mutex<()>> {
        let mut map = self.in_flight.lock().await;
        map.entry(key).or_default().clone()
    }

    #[cfg(test)]
    async fn in_flight_len(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

fn parse_schema(uri: &str, bytes: &[u8]) -> Result<Value, SchemaError> {
    serde_json::from_slice(bytes).map_err(|e| SchemaError::Parse {
        location: uri.to_string(),
        source: e,
    })
}
