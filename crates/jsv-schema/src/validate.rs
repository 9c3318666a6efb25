//! Validation façade.
//!
//! [`Validator`] is the public entry point: it resolves and acquires the
//! schema named by a URI, then hands the document, the parsed schema, and
//! the fragment-derived selector to the conformance engine.
//!
//! Failure semantics follow a strict split. Infrastructure problems
//! (malformed URI, unreachable origin, cache I/O, unparseable schema)
//! propagate untouched as [`SchemaError`] — they say nothing about the
//! document. Only a genuine conformance failure becomes a
//! [`ValidationError`], carrying status 422 and the engine's structured
//! violation list.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::acquire::SchemaAcquirer;
use crate::cache::SchemaCache;
use crate::engine::{ConformanceEngine, JsonSchemaEngine, Violation};
use crate::error::SchemaError;
use crate::fetch::SchemaFetcher;

/// Fixed HTTP-style status for conformance failures.
const VALIDATION_FAILED_STATUS: u16 = 422;

/// Structured payload of a conformance failure.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    /// Individual violations reported by the conformance engine.
    pub errors: Vec<Violation>,
}

/// The document does not conform to the schema.
///
/// This is the only *expected* failure of [`Validator::validate`]; every
/// other error means the answer could not be determined.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable summary.
    pub message: String,
    /// HTTP-style status code, always 422.
    pub status_code: u16,
    /// Structured violation list.
    pub detail: ValidationDetail,
}

impl ValidationError {
    fn new(errors: Vec<Violation>) -> Self {
        Self {
            message: "Data not valid against schema".to_string(),
            status_code: VALIDATION_FAILED_STATUS,
            detail: ValidationDetail { errors },
        }
    }
}

/// Outcome of [`Validator::validate`] when the document is not valid or
/// the schema could not be acquired.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// Schema acquisition failed; not a statement about the document.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The schema was acquired and the document failed conformance.
    #[error(transparent)]
    NotValid(#[from] ValidationError),
}

/// Immutable validator configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Root directory for the on-disk schema cache.
    pub cache_root: PathBuf,
    /// Remote `$ref` URIs resolved locally by the conformance engine
    /// instead of being treated as unknown.
    pub remote_references: HashMap<String, Value>,
}

impl ValidatorConfig {
    /// Configuration with the given cache root and no pre-registered
    /// references.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            remote_references: HashMap::new(),
        }
    }

    /// Pre-register a remote reference for local `$ref` resolution.
    pub fn with_remote_reference(mut self, uri: impl Into<String>, schema: Value) -> Self {
        self.remote_references.insert(uri.into(), schema);
        self
    }
}

/// Validates JSON documents against schemas referenced by URI.
pub struct Validator {
    acquirer: SchemaAcquirer,
    engine: Box<dyn ConformanceEngine>,
}

impl Validator {
    /// Build a validator with the default `jsonschema`-backed engine.
    pub fn new(config: ValidatorConfig) -> Result<Self, SchemaError> {
        let engine = JsonSchemaEngine::with_remote_references(config.remote_references.clone());
        Self::with_engine(config, Box::new(engine))
    }

    /// Build a validator with a caller-supplied conformance engine.
    pub fn with_engine(
        config: ValidatorConfig,
        engine: Box<dyn ConformanceEngine>,
    ) -> Result<Self, SchemaError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SchemaError::Http {
                uri: "client init".to_string(),
                source: e,
            })?;
        let acquirer = SchemaAcquirer::new(
            SchemaCache::new(config.cache_root),
            SchemaFetcher::new(http),
        );
        Ok(Self { acquirer, engine })
    }

    /// Validate `document` against the schema at `schema_uri`.
    ///
    /// A URI fragment (e.g. `#definitions/car`) scopes validation to that
    /// nested definition; otherwise the whole schema document applies.
    ///
    /// # Errors
    ///
    /// [`ValidateError::Schema`] when the schema cannot be acquired, and
    /// [`ValidateError::NotValid`] when the document fails conformance.
    pub async fn validate(
        &self,
        document: &Value,
        schema_uri: &str,
    ) -> Result<(), ValidateError> {
        let acquired = self.acquirer.acquire(schema_uri).await?;
        self.engine
            .check(document, &acquired.schema, acquired.selector.as_deref())
            .map_err(|violations| ValidationError::new(violations).into())
    }
}
