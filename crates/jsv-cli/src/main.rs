//! # jsv CLI Entry Point
//!
//! Validates a JSON file against a schema referenced by URI. Remote
//! schemas are fetched once and cached under the cache directory;
//! `file:` schemas are read directly.
//!
//! Exit codes: 0 on success, non-zero on any failure. Conformance
//! failures print the structured violation list; infrastructure failures
//! (unreachable origin, bad URI, cache corruption) print the error chain.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use jsv_schema::{ValidateError, Validator, ValidatorConfig};

/// Validate a JSON document against a JSON Schema referenced by URI.
///
/// The schema URI may use `http:`, `https:`, or `file:`, and may carry a
/// fragment such as `#definitions/car` to validate against a nested
/// definition instead of the whole schema document.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about)]
struct Cli {
    /// Path to the JSON document to validate.
    file: PathBuf,

    /// Schema URI (http, https, or file), optionally with a fragment.
    schema_uri: String,

    /// Directory for the on-disk cache of fetched remote schemas.
    #[arg(long, default_value = "schemas")]
    cache_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let content = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("cannot read document '{}'", cli.file.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("document '{}' is not valid JSON", cli.file.display()))?;

    let validator = Validator::new(ValidatorConfig::new(cli.cache_dir.clone()))?;

    tracing::debug!(
        document = %cli.file.display(),
        schema_uri = %cli.schema_uri,
        cache_dir = %cli.cache_dir.display(),
        "validating document"
    );

    match validator.validate(&document, &cli.schema_uri).await {
        Ok(()) => {
            println!("success");
            Ok(())
        }
        Err(ValidateError::NotValid(err)) => {
            eprintln!("{err} (status {})", err.status_code);
            eprintln!("{}", serde_json::to_string_pretty(&err.detail)?);
            std::process::exit(1);
        }
        // Infrastructure failures are not statements about the document;
        // report them as-is.
        Err(ValidateError::Schema(err)) => Err(err.into()),
    }
}
