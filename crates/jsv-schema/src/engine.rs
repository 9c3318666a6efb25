//! Conformance engine seam.
//!
//! Schema-conformance checking is delegated through the
//! [`ConformanceEngine`] trait so the acquisition layer stays independent
//! of any particular JSON Schema implementation. [`JsonSchemaEngine`] is
//! the default, backed by the `jsonschema` crate.
//!
//! ## Remote references
//!
//! The engine holds an immutable map of pre-registered remote references
//! (URI → schema document), installed once at construction. `$ref` URIs
//! are resolved from this map through a local retriever; anything unknown
//! resolves to the permissive empty schema. The engine itself never makes
//! a network request — fetching is the acquisition layer's job.

use std::collections::HashMap;

use jsonschema::{Retrieve, Uri};
use serde::Serialize;
use serde_json::Value;

/// A single conformance violation with structured context.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the document.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

/// Checks a document against a schema, optionally scoped to a subschema.
///
/// `selector` is a dotted path into the schema document (e.g.
/// `definitions.car`); `None` validates against the whole document. A
/// selector that does not resolve within the schema is a conformance
/// failure, not an infrastructure error.
pub trait ConformanceEngine: Send + Sync {
    /// Returns `Ok(())` on conformance, or the list of violations.
    fn check(
        &self,
        document: &Value,
        schema: &Value,
        selector: Option<&str>,
    ) -> Result<(), Vec<Violation>>;
}

/// Resolves `$ref` URIs from pre-registered schemas loaded in memory.
///
/// Unknown URIs resolve to the permissive empty schema so that validation
/// proceeds without network I/O even when a referenced meta-schema is not
/// registered.
struct PreloadedRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for PreloadedRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(value) = self.schemas_by_uri.get(uri.as_str()) {
            return Ok(value.clone());
        }
        Ok(serde_json::json!({}))
    }
}

/// Default conformance engine backed by the `jsonschema` crate.
#[derive(Debug, Default)]
pub struct JsonSchemaEngine {
    /// Pre-registered remote references, immutable after construction.
    remote_references: HashMap<String, Value>,
}

impl JsonSchemaEngine {
    /// Create an engine with no pre-registered references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that resolves the given `$ref` URIs locally
    /// instead of treating them as unknown.
    pub fn with_remote_references(remote_references: HashMap<String, Value>) -> Self {
        Self { remote_references }
    }

    /// Walk a dotted selector path through the schema document.
    ///
    /// Each segment indexes an object key, or an array element when the
    /// segment parses as a number.
    fn select<'a>(schema: &'a Value, selector: &str) -> Option<&'a Value> {
        let mut current = schema;
        for segment in selector.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Translate a dotted selector into a JSON Pointer, escaping `~` and
    /// `/` per RFC 6901.
    fn pointer_from_selector(selector: &str) -> String {
        selector
            .split('.')
            .map(|s| s.replace('~', "~0").replace('/', "~1"))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// URI the schema document under validation is registered under, so a
/// selector can be expressed as a `$ref` into it.
const DOCUMENT_URI: &str = "jsv://document/";

impl ConformanceEngine for JsonSchemaEngine {
    fn check(
        &self,
        document: &Value,
        schema: &Value,
        selector: Option<&str>,
    ) -> Result<(), Vec<Violation>> {
        // Scoped validation compiles the WHOLE schema document and enters
        // it at the selector, so `$ref`s inside the selected subschema
        // that point elsewhere in the document (the common shape for
        // fragment-addressed `definitions`) still resolve.
        let scoped;
        let target = match selector {
            None => schema,
            Some(sel) => {
                if Self::select(schema, sel).is_none() {
                    return Err(vec![Violation {
                        instance_path: String::new(),
                        schema_path: String::new(),
                        message: format!("subschema '{sel}' not found in schema document"),
                    }]);
                }
                scoped = serde_json::json!({
                    "$ref": format!("{DOCUMENT_URI}#/{}", Self::pointer_from_selector(sel))
                });
                &scoped
            }
        };

        let mut schemas_by_uri = self.remote_references.clone();
        schemas_by_uri.insert(DOCUMENT_URI.to_string(), schema.clone());

        let mut opts = jsonschema::options();
        opts.with_retriever(PreloadedRetriever { schemas_by_uri });

        let validator = match opts.build(target) {
            Ok(v) => v,
            Err(e) => {
                return Err(vec![Violation {
                    instance_path: String::new(),
                    schema_path: String::new(),
                    message: format!("schema cannot be compiled: {e}"),
                }]);
            }
        };

        let violations: Vec<Violation> = validator
            .iter_errors(document)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conforming_document_passes() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });
        engine.check(&json!({"name": "x"}), &schema, None).unwrap();
    }

    #[test]
    fn missing_required_property_reports_violation() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });
        let violations = engine.check(&json!({}), &schema, None).unwrap_err();
        assert!(!violations.is_empty());
        assert!(violations.iter().any(|v| v.message.contains("name")));
    }

    #[test]
    fn additional_properties_rejected() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        });
        let violations = engine.check(&json!({"extra": 1}), &schema, None).unwrap_err();
        assert!(!violations.is_empty());
    }

    #[test]
    fn selector_scopes_validation_to_nested_definition() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "definitions": {
                "car": {
                    "type": "object",
                    "properties": {"wheels": {"type": "integer"}},
                    "required": ["wheels"]
                }
            }
        });
        engine
            .check(&json!({"wheels": 4}), &schema, Some("definitions.car"))
            .unwrap();
        let violations = engine
            .check(&json!({}), &schema, Some("definitions.car"))
            .unwrap_err();
        assert!(violations.iter().any(|v| v.message.contains("wheels")));
    }

    #[test]
    fn selector_resolves_internal_refs_against_whole_document() {
        let engine = JsonSchemaEngine::new();
        // The selected definition references a sibling definition; scoped
        // validation must still resolve it within the full document.
        let schema = json!({
            "definitions": {
                "wheel": {
                    "type": "object",
                    "properties": {"radius": {"type": "number"}},
                    "required": ["radius"]
                },
                "car": {
                    "type": "object",
                    "properties": {"wheel": {"$ref": "#/definitions/wheel"}},
                    "required": ["wheel"]
                }
            }
        });

        engine
            .check(
                &json!({"wheel": {"radius": 1.5}}),
                &schema,
                Some("definitions.car"),
            )
            .unwrap();

        let violations = engine
            .check(&json!({"wheel": {}}), &schema, Some("definitions.car"))
            .unwrap_err();
        assert!(
            violations.iter().any(|v| v.message.contains("radius")),
            "expected a violation from the referenced definition, got: {violations:?}"
        );
    }

    #[test]
    fn unresolvable_selector_is_a_conformance_failure() {
        let engine = JsonSchemaEngine::new();
        let violations = engine
            .check(&json!({}), &json!({}), Some("definitions.ghost"))
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("definitions.ghost"));
    }

    #[test]
    fn numeric_selector_segment_indexes_arrays() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "anyOf": [
                {"type": "string"},
                {"type": "integer"}
            ]
        });
        engine.check(&json!(42), &schema, Some("anyOf.1")).unwrap();
        assert!(engine.check(&json!("x"), &schema, Some("anyOf.1")).is_err());
    }

    #[test]
    fn preregistered_remote_reference_resolves_locally() {
        let mut refs = HashMap::new();
        refs.insert(
            "http://schemas.test/name.json".to_string(),
            json!({"type": "string"}),
        );
        let engine = JsonSchemaEngine::with_remote_references(refs);

        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"$ref": "http://schemas.test/name.json"}
            }
        });
        engine.check(&json!({"name": "x"}), &schema, None).unwrap();
        let violations = engine.check(&json!({"name": 1}), &schema, None).unwrap_err();
        assert!(!violations.is_empty());
    }

    #[test]
    fn unknown_remote_reference_is_permissive() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "type": "object",
            "properties": {
                "anything": {"$ref": "http://unregistered.test/x.json"}
            }
        });
        // Unknown $refs must not trigger network fetches or failures.
        engine.check(&json!({"anything": [1, 2]}), &schema, None).unwrap();
    }
}
