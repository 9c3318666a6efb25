//! # jsv-schema — Cached remote-schema JSON validation
//!
//! Validates JSON documents against JSON Schema documents referenced by
//! URI. Remote schemas (`http`/`https`) are fetched once, persisted to an
//! on-disk cache, and served from disk on every later validation; `file:`
//! schemas are read directly and never cached. A URI fragment such as
//! `#definitions/car` scopes validation to a nested definition.
//!
//! ## Layers
//!
//! - [`resolver`] — splits a schema URI into origin, cache path, and
//!   subschema selector. Pure, no I/O.
//! - [`cache`] — the on-disk store, `<root>/<host>/<url-path>`, with
//!   atomic temp-then-rename writes.
//! - [`fetch`] — retrieves raw schema bytes from `file:` or `http(s):`
//!   origins, one attempt per call.
//! - [`acquire`] — orchestration: cache check, fetch on miss, persist,
//!   parse. A failed persist degrades to an uncached success.
//! - [`engine`] — the conformance-engine seam; the default engine is
//!   backed by the `jsonschema` crate.
//! - [`validate`] — the public façade tying acquisition to conformance
//!   checking.
//!
//! ## Error policy
//!
//! Infrastructure failures ([`SchemaError`]) propagate unchanged — they
//! mean the answer could not be determined. Only genuine conformance
//! failures become [`ValidationError`] (status 422, structured violation
//! list).

pub mod acquire;
pub mod cache;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod resolver;
pub mod validate;

pub use acquire::{AcquiredSchema, SchemaAcquirer};
pub use cache::SchemaCache;
pub use engine::{ConformanceEngine, JsonSchemaEngine, Violation};
pub use error::SchemaError;
pub use fetch::SchemaFetcher;
pub use resolver::{resolve, Origin, ResolvedUri};
pub use validate::{
    ValidateError, ValidationDetail, ValidationError, Validator, ValidatorConfig,
};
