//! On-disk schema cache.
//!
//! Remote schemas are persisted under `<root>/<host>/<url-path>`, one file
//! per distinct (host, path) pair, holding the raw fetched bytes. Cached
//! files are immutable once written: there is no TTL and no invalidation.
//!
//! Writes are atomic: bytes land in a uniquely named temp sibling and are
//! renamed into place, so a cache file never exists in a partially written
//! state. Concurrent writers for the same path are safe — whichever rename
//! lands last wins, and both leave a complete file.

use std::path::{Path, PathBuf};

use serde_json::Value;
use uuid::Uuid;

use crate::error::SchemaError;

/// Filesystem-backed store for fetched schema documents.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    /// Root directory of the cache tree.
    root: PathBuf,
}

impl SchemaCache {
    /// Create a cache rooted at `root`. The directory is created lazily on
    /// first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the cache file for a cache-relative path.
    pub fn file_path(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    /// Check whether a schema is cached at `rel`.
    ///
    /// Only "not found" — including a missing or non-directory parent in
    /// the cache tree — maps to `false`; any other stat failure (e.g. a
    /// permission error on the cache tree) is a [`SchemaError::CacheIo`]
    /// rather than being silently treated as a miss.
    pub async fn exists(&self, rel: &Path) -> Result<bool, SchemaError> {
        let path = self.file_path(rel);
        match tokio::fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(SchemaError::CacheIo { path, source: e }),
        }
    }

    /// Read and parse the cached schema at `rel`.
    ///
    /// The file is expected to exist (callers check [`exists`] first). A
    /// read failure is a [`SchemaError::CacheIo`]; bytes that fail to parse
    /// as JSON are a [`SchemaError::Parse`] — cache corruption is surfaced,
    /// never ignored.
    ///
    /// [`exists`]: SchemaCache::exists
    pub async fn read(&self, rel: &Path) -> Result<Value, SchemaError> {
        let path = self.file_path(rel);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| SchemaError::CacheIo {
                path: path.clone(),
                source: e,
            })?;
        serde_json::from_slice(&bytes).map_err(|e| SchemaError::Parse {
            location: path.display().to_string(),
            source: e,
        })
    }

    /// Persist schema bytes at `rel`, creating parent directories as
    /// needed.
    ///
    /// The bytes are written to a temp file in the same directory and
    /// renamed into place, so the final path either does not exist or
    /// holds the complete content — a half-written file can never be
    /// mistaken for a cached schema by a later [`exists`] check.
    ///
    /// [`exists`]: SchemaCache::exists
    pub async fn write(&self, rel: &Path, bytes: &[u8]) -> Result<(), SchemaError> {
        let path = self.file_path(rel);
        let dir = path.parent().ok_or_else(|| SchemaError::CacheIo {
            path: path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "cache path has no parent directory",
            ),
        })?;

        // create_dir_all is idempotent, so concurrent acquisitions racing
        // to create the same host directory both succeed.
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| SchemaError::CacheIo {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| SchemaError::CacheIo {
                path: tmp.clone(),
                source: e,
            })?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            // Best effort; the stray temp file is harmless to correctness.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SchemaError::CacheIo { path, source: e });
        }
        Ok(())
    }
}
