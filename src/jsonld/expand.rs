//! JSON-LD document expansion.
//!
//! Rewrites a compacted document into its fully-qualified form: term keys
//! become IRIs, values become `@value`/`@id` object arrays, and terms that
//! expand to neither an IRI nor a keyword are dropped (standard JSON-LD
//! behavior — the pipeline compensates for required fields downstream).

use super::context::{is_absolute, Container, Context, TermDef, TermType};
use super::{JsonLdError, Result};
use serde_json::{json, Map, Value};

/// Expand a JSON-LD document against a context.
///
/// A document carrying its own `@context` member uses that instead of the
/// supplied one.
pub fn document(doc: &Value, ctx: &Context) -> Result<Value> {
    match doc {
        Value::Object(map) => {
            let local;
            let active = match map.get("@context") {
                Some(c) => {
                    local = Context::parse(c)?;
                    &local
                }
                None => ctx,
            };
            Ok(Value::Object(expand_node(map, active)?))
        }
        Value::Array(items) => {
            let expanded: Result<Vec<Value>> =
                items.iter().map(|item| document(item, ctx)).collect();
            Ok(Value::Array(expanded?))
        }
        other => Err(JsonLdError::Unexpected {
            message: format!("cannot expand a non-object document: {other}"),
        }),
    }
}

fn expand_node(map: &Map<String, Value>, ctx: &Context) -> Result<Map<String, Value>> {
    let mut result = Map::new();

    for (key, value) in map {
        if key == "@context" {
            continue;
        }

        if key == "@id" {
            if let Some(s) = value.as_str() {
                result.insert("@id".to_string(), json!(ctx.expand_ref(s)));
            }
            continue;
        }

        if key == "@type" {
            let types: Vec<Value> = match value {
                Value::String(s) => vec![json!(ctx.expand_key(s).0)],
                Value::Array(arr) => arr
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| json!(ctx.expand_key(s).0))
                    .collect(),
                _ => vec![],
            };
            result.insert("@type".to_string(), Value::Array(types));
            continue;
        }

        let (expanded_key, term) = ctx.expand_key(key);

        // Terms that expand to neither an IRI nor a keyword are dropped.
        if term.is_none() && !is_absolute(&expanded_key) && !expanded_key.starts_with('@') {
            continue;
        }

        let values = expand_value(key, value, term, ctx)?;
        if values.is_empty() {
            continue;
        }
        let slot = result
            .entry(expanded_key)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(existing) = slot {
            existing.extend(values);
        }
    }

    Ok(result)
}

fn expand_value(
    key: &str,
    value: &Value,
    term: Option<&TermDef>,
    ctx: &Context,
) -> Result<Vec<Value>> {
    let declared_type = term.and_then(|t| t.type_.as_ref());

    match value {
        Value::Null => Ok(vec![]),

        Value::Bool(_) | Value::Number(_) => {
            let mut obj = Map::new();
            obj.insert("@value".to_string(), value.clone());
            if let Some(TermType::Iri(t)) = declared_type {
                obj.insert("@type".to_string(), json!(t));
            }
            Ok(vec![Value::Object(obj)])
        }

        Value::String(s) => {
            if declared_type == Some(&TermType::Id) {
                return Ok(vec![json!({"@id": ctx.expand_ref(s)})]);
            }
            let mut obj = Map::new();
            obj.insert("@value".to_string(), json!(s));
            if let Some(TermType::Iri(t)) = declared_type {
                obj.insert("@type".to_string(), json!(t));
            }
            Ok(vec![Value::Object(obj)])
        }

        Value::Array(items) => {
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                if item.is_array() {
                    return Err(JsonLdError::NestedSequence {
                        key: key.to_string(),
                    });
                }
                results.extend(expand_value(key, item, term, ctx)?);
            }
            if term.and_then(|t| t.container) == Some(Container::List) {
                return Ok(vec![json!({"@list": results})]);
            }
            Ok(results)
        }

        Value::Object(map) => {
            // Value objects pass through with their IRI positions expanded.
            if map.contains_key("@value") {
                return Ok(vec![value.clone()]);
            }
            // Anything else is a nested node.
            Ok(vec![Value::Object(expand_node(map, ctx)?)])
        }
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
    fn test_expand_basic_node() {
        let c = ctx(json!({
            "m2r": "http://med2rdf.org/ontology/m2r#",
            "cpdb": "http://cpdb.example.org/",
            "label": "m2r:label"
        }));
        let doc = json!({
            "@id": "cpdb:P1-P2",
            "@type": "m2r:MacromolecularComplex",
            "label": "P1-P2"
        });

        let out = document(&doc, &c).unwrap();
        let obj = out.as_object().unwrap();
        assert_eq!(obj["@id"], "http://cpdb.example.org/P1-P2");
        assert_eq!(
            obj["@type"],
            json!(["http://med2rdf.org/ontology/m2r#MacromolecularComplex"])
        );
        assert_eq!(
            obj["http://med2rdf.org/ontology/m2r#label"],
            json!([{"@value": "P1-P2"}])
        );
    }

    #[test]
    fn test_unmapped_terms_drop() {
        let c = ctx(json!({"m2r": "http://med2rdf.org/ontology/m2r#"}));
        let doc = json!({"participant": ["uniprot_id:Q1"]});

        let out = document(&doc, &c).unwrap();
        assert!(out.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_vocab_keeps_terms() {
        let c = ctx(json!({"@vocab": "http://example.org/ns/"}));
        let doc = json!({"participant": ["uniprot_id:Q1", "uniprot_id:Q2"]});

        let out = document(&doc, &c).unwrap();
        let vals = out["http://example.org/ns/participant"].as_array().unwrap();
        assert_eq!(vals.len(), 2);
        assert_eq!(vals[0], json!({"@value": "uniprot_id:Q1"}));
    }

    #[test]
    fn test_typed_id_values_expand() {
        let c = ctx(json!({
            "pmid": "http://identifiers.org/pubmed/",
            "reference": {"@id": "http://example.org/reference", "@type": "@id"}
        }));
        let doc = json!({"reference": "pmid:111"});

        let out = document(&doc, &c).unwrap();
        assert_eq!(
            out["http://example.org/reference"],
            json!([{"@id": "http://identifiers.org/pubmed/111"}])
        );
    }

    #[test]
    fn test_nested_node_expands() {
        let c = ctx(json!({"@vocab": "http://example.org/ns/"}));
        let doc = json!({"evidence": {"reference": "pmid:111"}});

        let out = document(&doc, &c).unwrap();
        let evidence = &out["http://example.org/ns/evidence"][0];
        assert_eq!(
            evidence["http://example.org/ns/reference"],
            json!([{"@value": "pmid:111"}])
        );
    }

    #[test]
    fn test_nested_arrays_rejected() {
        let c = ctx(json!({"@vocab": "http://example.org/ns/"}));
        let doc = json!({"xs": [[1, 2]]});

        assert!(matches!(
            document(&doc, &c),
            Err(JsonLdError::NestedSequence { .. })
        ));
    }

    #[test]
    fn test_null_values_drop() {
        let c = ctx(json!({"@vocab": "http://example.org/ns/"}));
        let doc = json!({"x": null});

        let out = document(&doc, &c).unwrap();
        assert!(out.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_local_context_wins() {
        let outer = ctx(json!({"@vocab": "http://outer.example.org/"}));
        let doc = json!({
            "@context": {"@vocab": "http://inner.example.org/"},
            "x": 1
        });

        let out = document(&doc, &outer).unwrap();
        assert!(out.as_object().unwrap().contains_key("http://inner.example.org/x"));
    }
}
