//! `@context` parsing and compact-name resolution.

use super::{JsonLdError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Container types for `@container` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
}

/// Type coercion for a term: `@id` or a datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermType {
    Id,
    Iri(String),
}

/// A single term definition.
#[derive(Debug, Clone, Default)]
pub struct TermDef {
    /// The expanded IRI (`@id`).
    pub id: Option<String>,
    /// The datatype (`@type`).
    pub type_: Option<TermType>,
    /// Container type (`@container`).
    pub container: Option<Container>,
}

/// A parsed `@context`: short names and prefixes mapped to IRIs.
///
/// Loaded once per run and shared read-only across workers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Default vocabulary (`@vocab`).
    pub vocab: Option<String>,
    /// Base IRI (`@base`).
    pub base: Option<String>,
    terms: BTreeMap<String, TermDef>,
}

impl Context {
    /// Parse a context value (a bare object, or a document with `@context`).
    pub fn parse(value: &Value) -> Result<Context> {
        let map = match value {
            Value::Object(map) => match map.get("@context") {
                Some(inner) => return Context::parse(inner),
                None => map,
            },
            other => {
                return Err(JsonLdError::InvalidContext {
                    message: format!("expected an object, got {}", json_kind(other)),
                });
            }
        };

        let mut ctx = Context::default();

        // First pass: @-keywords.
        for (key, val) in map {
            match key.as_str() {
                "@vocab" => {
                    ctx.vocab = Some(require_string(key, val)?);
                }
                "@base" => {
                    ctx.base = Some(require_string(key, val)?);
                }
                _ => {}
            }
        }

        // Second pass: term definitions.
        for (key, val) in map {
            if key.starts_with('@') {
                continue;
            }
            let def = parse_term(key, val, map, ctx.vocab.as_deref())?;
            ctx.terms.insert(key.clone(), def);
        }

        Ok(ctx)
    }

    /// Get a term definition by its short name.
    pub fn get(&self, term: &str) -> Option<&TermDef> {
        self.terms.get(term)
    }

    /// Iterate term definitions (used to build compaction tables).
    pub fn terms(&self) -> impl Iterator<Item = (&String, &TermDef)> {
        self.terms.iter()
    }

    /// Resolve a compact prefixed name (`prefix:suffix`) to a full URI.
    ///
    /// The prefix is the text before the first `:`, or the whole string when
    /// there is no colon. An unknown prefix fails with
    /// [`JsonLdError::PrefixNotFound`]. When a suffix is present and the base
    /// URI ends in neither `#` nor `/`, a `#` is inserted before it; a bare
    /// prefix returns the base URI unchanged.
    ///
    /// Anything containing `://` is treated as already expanded and returned
    /// as-is, since a scheme delimiter cannot appear in a compact name.
    pub fn expand_curie(&self, name: &str) -> Result<String> {
        if name.contains("://") {
            return Ok(name.to_string());
        }
        let (prefix, suffix) = match name.split_once(':') {
            Some((p, s)) => (p, Some(s)),
            None => (name, None),
        };
        let base = self
            .terms
            .get(prefix)
            .and_then(|def| def.id.as_deref())
            .ok_or_else(|| JsonLdError::PrefixNotFound {
                prefix: prefix.to_string(),
            })?;
        match suffix {
            None => Ok(base.to_string()),
            Some(sfx) => {
                if base.ends_with('#') || base.ends_with('/') {
                    Ok(format!("{base}{sfx}"))
                } else {
                    Ok(format!("{base}#{sfx}"))
                }
            }
        }
    }

    /// Expand a key or type, returning the IRI and any matching term.
    ///
    /// Exact term match first, then prefix match, then `@vocab`.
    pub fn expand_key<'a>(&'a self, key: &str) -> (String, Option<&'a TermDef>) {
        if let Some(def) = self.terms.get(key) {
            let iri = def.id.clone().unwrap_or_else(|| key.to_string());
            return (iri, Some(def));
        }
        if let Some((prefix, suffix)) = parse_prefix(key) {
            if let Some(def) = self.terms.get(prefix) {
                if let Some(ref base) = def.id {
                    return (format!("{base}{suffix}"), Some(def));
                }
            }
        }
        if !key.starts_with('@') && !any_iri(key) {
            if let Some(ref vocab) = self.vocab {
                return (format!("{vocab}{key}"), None);
            }
        }
        (key.to_string(), None)
    }

    /// Expand an `@id`-position reference. `@vocab` does not apply; `@base`
    /// does.
    pub fn expand_ref(&self, value: &str) -> String {
        if let Some(def) = self.terms.get(value) {
            if let Some(ref id) = def.id {
                return id.clone();
            }
        }
        if let Some((prefix, suffix)) = parse_prefix(value) {
            if let Some(def) = self.terms.get(prefix) {
                if let Some(ref base) = def.id {
                    return format!("{base}{suffix}");
                }
            }
        }
        if !is_absolute(value) && !value.starts_with('@') {
            if let Some(ref base) = self.base {
                return format!("{base}{value}");
            }
        }
        value.to_string()
    }
}

fn require_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| JsonLdError::InvalidContext {
            message: format!("{key} must be a string"),
        })
}

/// IRI of a raw context entry: a plain string, or an object's `@id`.
fn entry_iri(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("@id").and_then(|v| v.as_str()),
        _ => None,
    }
}

/// Resolve a possibly-compact IRI against the raw context map.
fn resolve_iri(value: &str, raw: &serde_json::Map<String, Value>, vocab: Option<&str>) -> String {
    if let Some((prefix, suffix)) = parse_prefix(value) {
        if let Some(base) = raw.get(prefix).and_then(entry_iri) {
            return format!("{base}{suffix}");
        }
    }
    if !value.starts_with('@') && !any_iri(value) {
        if let Some(vocab) = vocab {
            return format!("{vocab}{value}");
        }
    }
    value.to_string()
}

fn parse_term(
    key: &str,
    value: &Value,
    raw: &serde_json::Map<String, Value>,
    vocab: Option<&str>,
) -> Result<TermDef> {
    match value {
        Value::String(s) => Ok(TermDef {
            id: Some(resolve_iri(s, raw, vocab)),
            ..Default::default()
        }),
        Value::Object(map) => {
            let mut def = TermDef::default();
            for (k, v) in map {
                match k.as_str() {
                    "@id" => {
                        if let Some(s) = v.as_str() {
                            def.id = Some(resolve_iri(s, raw, vocab));
                        }
                    }
                    "@type" => {
                        let s = require_string(k, v)?;
                        def.type_ = Some(match resolve_iri(&s, raw, vocab).as_str() {
                            "@id" => TermType::Id,
                            iri => TermType::Iri(iri.to_string()),
                        });
                    }
                    "@container" => {
                        def.container = Some(match v.as_str() {
                            Some("@list") => Container::List,
                            Some("@set") => Container::Set,
                            _ => {
                                return Err(JsonLdError::InvalidContext {
                                    message: format!("unsupported @container for '{key}': {v}"),
                                });
                            }
                        });
                    }
                    _ => {} // Ignore unknown keys
                }
            }
            // No @id: infer from the key itself.
            if def.id.is_none() {
                def.id = Some(resolve_iri(key, raw, vocab));
            }
            Ok(def)
        }
        _ => Err(JsonLdError::InvalidContext {
            message: format!("invalid entry for '{key}': {value}"),
        }),
    }
}

/// Parse a compact IRI like `schema:name` into `(prefix, suffix)`.
///
/// Rejects patterns that indicate an absolute IRI (a suffix starting with
/// `//`, or a prefix containing `/`).
pub fn parse_prefix(s: &str) -> Option<(&str, &str)> {
    let (prefix, suffix) = s.split_once(':')?;
    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// Returns true if the string contains a colon (IRI or compact IRI).
pub fn any_iri(s: &str) -> bool {
    s.contains(':')
}

/// Returns true if the IRI starts with an RFC 3986 scheme.
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(pos) => {
            let scheme = &iri[..pos];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> Context {
        Context::parse(&value).unwrap()
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(parse_prefix("pmid:12345"), Some(("pmid", "12345")));
        assert_eq!(parse_prefix("http://example.org"), None);
        assert_eq!(parse_prefix("noColon"), None);
    }

    #[test]
    fn test_parse_unwraps_context_member() {
        let c = ctx(json!({"@context": {"pmid": "http://example.com/pubmed/"}}));
        assert!(c.get("pmid").is_some());
    }

    #[test]
    fn test_expand_curie_with_suffix() {
        let c = ctx(json!({"pmid": "http://example.com/pubmed/"}));
        assert_eq!(
            c.expand_curie("pmid:12345").unwrap(),
            "http://example.com/pubmed/12345"
        );
    }

    #[test]
    fn test_expand_curie_bare_prefix_unchanged() {
        let c = ctx(json!({"pmid": "http://example.com/pubmed/"}));
        assert_eq!(
            c.expand_curie("pmid").unwrap(),
            "http://example.com/pubmed/"
        );
    }

    #[test]
    fn test_expand_curie_inserts_hash() {
        let c = ctx(json!({"m2r": "http://med2rdf.org/ontology"}));
        assert_eq!(
            c.expand_curie("m2r:Complex").unwrap(),
            "http://med2rdf.org/ontology#Complex"
        );
    }

    #[test]
    fn test_expand_curie_object_entry() {
        let c = ctx(json!({"taxid": {"@id": "http://identifiers.org/taxonomy/"}}));
        assert_eq!(
            c.expand_curie("taxid:9606").unwrap(),
            "http://identifiers.org/taxonomy/9606"
        );
    }

    #[test]
    fn test_expand_curie_unknown_prefix() {
        let c = ctx(json!({"pmid": "http://example.com/pubmed/"}));
        assert!(matches!(
            c.expand_curie("doi:10.1000/1"),
            Err(JsonLdError::PrefixNotFound { prefix }) if prefix == "doi"
        ));
    }

    #[test]
    fn test_expand_curie_skips_absolute() {
        let c = ctx(json!({"pmid": "http://example.com/pubmed/"}));
        assert_eq!(
            c.expand_curie("http://example.org/x").unwrap(),
            "http://example.org/x"
        );
    }

    #[test]
    fn test_expand_key_vocab_fallback() {
        let c = ctx(json!({"@vocab": "http://schema.org/"}));
        let (iri, def) = c.expand_key("name");
        assert_eq!(iri, "http://schema.org/name");
        assert!(def.is_none());
    }

    #[test]
    fn test_expand_key_term_resolution() {
        let c = ctx(json!({
            "schema": "http://schema.org/",
            "label": "schema:name"
        }));
        assert_eq!(c.expand_key("label").0, "http://schema.org/name");
        assert_eq!(c.expand_key("schema:Person").0, "http://schema.org/Person");
    }

    #[test]
    fn test_expand_ref_uses_base_not_vocab() {
        let c = ctx(json!({
            "@vocab": "http://vocab.example.org/",
            "@base": "http://base.example.org/"
        }));
        assert_eq!(c.expand_ref("node1"), "http://base.example.org/node1");
    }

    #[test]
    fn test_typed_term() {
        let c = ctx(json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "count": {"@id": "http://example.org/count", "@type": "xsd:integer"}
        }));
        assert_eq!(
            c.get("count").unwrap().type_,
            Some(TermType::Iri(
                "http://www.w3.org/2001/XMLSchema#integer".to_string()
            ))
        );
    }
}
