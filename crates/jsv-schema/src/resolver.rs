//! Schema URI resolution.
//!
//! Splits a schema URI into three independent concerns:
//!
//! - the **origin** to fetch bytes from (`file:` path or `http(s):` URL),
//! - the **cache path** (`<host>/<url-path>`, relative to the cache root)
//!   that remote schemas are persisted under, and
//! - the **subschema selector** derived from the fragment.
//!
//! The fragment never participates in the cache path: two URIs that differ
//! only by fragment identify the same schema document and share one cached
//! file. Resolution is pure — no I/O happens here.

use std::path::{Component, PathBuf};

use url::Url;

use crate::error::SchemaError;

/// Where schema bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A local file, dereferenced directly and never cached.
    File(PathBuf),
    /// A remote document fetched over HTTP(S), cached on first use.
    Http(Url),
}

/// A schema URI broken into origin, cache location, and selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUri {
    /// Where to fetch the schema from.
    pub origin: Origin,
    /// Cache-root-relative path for remote schemas. `None` for `file:`
    /// origins, which bypass the cache entirely.
    pub cache_path: Option<PathBuf>,
    /// Dotted subschema path derived from the fragment, e.g. fragment
    /// `#definitions/car` becomes `definitions.car`. `None` means the
    /// whole document is the validation target.
    pub selector: Option<String>,
}

/// Resolve a schema URI into its origin, cache path, and selector.
///
/// Supported schemes are `http`, `https`, and `file`. Anything else, and
/// any URI whose host/path would escape the cache root, is rejected as
/// [`SchemaError::MalformedUri`].
pub fn resolve(uri: &str) -> Result<ResolvedUri, SchemaError> {
    let parsed = Url::parse(uri).map_err(|e| SchemaError::MalformedUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let selector = selector_from_fragment(parsed.fragment());

    match parsed.scheme() {
        "file" => {
            let path = parsed
                .to_file_path()
                .map_err(|_| SchemaError::MalformedUri {
                    uri: uri.to_string(),
                    reason: "file URI does not map to a local path".to_string(),
                })?;
            Ok(ResolvedUri {
                origin: Origin::File(path),
                cache_path: None,
                selector,
            })
        }
        "http" | "https" => {
            let cache_path = cache_path_for(&parsed).ok_or_else(|| SchemaError::MalformedUri {
                uri: uri.to_string(),
                reason: "URI host/path does not map to a safe cache location".to_string(),
            })?;
            Ok(ResolvedUri {
                origin: Origin::Http(parsed),
                cache_path: Some(cache_path),
                selector,
            })
        }
        other => Err(SchemaError::MalformedUri {
            uri: uri.to_string(),
            reason: format!("unsupported scheme '{other}' (expected http, https, or file)"),
        }),
    }
}

/// Map fragment `#a/b/c` to selector `a.b.c`. An absent or empty fragment
/// (bare `#`) means whole-document validation. Whether the dotted path
/// actually exists in the schema is the conformance engine's concern.
fn selector_from_fragment(fragment: Option<&str>) -> Option<String> {
    match fragment {
        None => None,
        Some("") => None,
        Some(frag) => Some(frag.replace('/', ".")),
    }
}

/// Derive the `<host>/<url-path>` cache-relative path for a remote URI.
///
/// Returns `None` when the URI has no host, or when any path segment is a
/// traversal component (`.` or `..`) that could escape the cache root.
fn cache_path_for(url: &Url) -> Option<PathBuf> {
    let host = url.host_str()?;
    if host.is_empty() {
        return None;
    }
    // Distinct ports are distinct origins and must not share a cache file.
    let host_dir = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let mut path = PathBuf::from(host_dir);
    for segment in url.path_segments()? {
        if segment.is_empty() {
            continue;
        }
        if segment == "." || segment == ".." {
            return None;
        }
        path.push(segment);
    }

    // The file must live strictly below `<cache-root>/<host>`.
    if path.components().count() < 2 {
        return None;
    }
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_uri_resolves_to_host_path_cache_location() {
        let resolved = resolve("http://example.com/schemas/car.json").unwrap();
        assert!(matches!(resolved.origin, Origin::Http(_)));
        assert_eq!(
            resolved.cache_path,
            Some(PathBuf::from("example.com/schemas/car.json"))
        );
        assert_eq!(resolved.selector, None);
    }

    #[test]
    fn fragment_does_not_affect_cache_path() {
        let bare = resolve("https://example.com/s.json").unwrap();
        let with_fragment = resolve("https://example.com/s.json#definitions/car").unwrap();
        assert_eq!(bare.cache_path, with_fragment.cache_path);
    }

    #[test]
    fn fragment_maps_to_dotted_selector() {
        let resolved = resolve("http://example.com/s.json#definitions/car").unwrap();
        assert_eq!(resolved.selector.as_deref(), Some("definitions.car"));
    }

    #[test]
    fn bare_hash_fragment_means_whole_document() {
        let resolved = resolve("http://example.com/s.json#").unwrap();
        assert_eq!(resolved.selector, None);
    }

    #[test]
    fn deep_fragment_maps_each_slash() {
        let resolved = resolve("http://example.com/s.json#a/b/c").unwrap();
        assert_eq!(resolved.selector.as_deref(), Some("a.b.c"));
    }

    #[test]
    fn explicit_port_is_part_of_the_cache_key() {
        let resolved = resolve("http://example.com:8080/s.json").unwrap();
        assert_eq!(
            resolved.cache_path,
            Some(PathBuf::from("example.com:8080/s.json"))
        );
    }

    #[test]
    fn file_uri_has_no_cache_path() {
        let resolved = resolve("file:///tmp/schema.json").unwrap();
        assert_eq!(resolved.origin, Origin::File(PathBuf::from("/tmp/schema.json")));
        assert_eq!(resolved.cache_path, None);
    }

    #[test]
    fn file_uri_keeps_selector() {
        let resolved = resolve("file:///tmp/schema.json#definitions/wheel").unwrap();
        assert_eq!(resolved.selector.as_deref(), Some("definitions.wheel"));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let err = resolve("ftp://example.com/s.json").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedUri { .. }));
    }

    #[test]
    fn unparseable_uri_is_rejected() {
        let err = resolve("not a uri at all").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedUri { .. }));
    }

    #[test]
    fn traversal_segments_cannot_escape_the_cache_root() {
        // URI parsing normalizes dot-segments before they reach the cache
        // path; the result stays under `<host>/`.
        let resolved = resolve("http://example.com/a/../schemas/car.json").unwrap();
        assert_eq!(
            resolved.cache_path,
            Some(PathBuf::from("example.com/schemas/car.json"))
        );
    }

    #[test]
    fn host_only_uri_is_rejected() {
        // Nothing below `<host>/` to cache into.
        let err = resolve("http://example.com/").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedUri { .. }));
    }
}
