//! JSON-LD document compaction.
//!
//! The inverse of expansion: property IRIs are re-shortened through a
//! precomputed reverse lookup ([`Compactor`]), value objects collapse back to
//! plain values, and single-element arrays unwrap to scalars.

use super::context::{Container, Context, TermType};
use super::{JsonLdError, Result};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Sentinel names for @vocab/@base entries in the reverse tables.
const VOCAB: &str = ":vocab";
const BASE: &str = ":base";

/// A precomputed lookup table for efficient IRI compaction.
///
/// Namespace IRI entries are sorted longest-first so the most specific prefix
/// wins. Build once from a [`Context`], then call [`Compactor::vocab`] or
/// [`Compactor::id`] per IRI — no per-call rebuilds.
#[derive(Debug, Clone)]
pub struct Compactor {
    /// Full IRI → term (exact matches).
    exact: HashMap<String, String>,
    /// Namespace IRIs (ending in `/` or `#`) with their prefix names,
    /// sorted longest-first for greedy matching.
    prefixes: Vec<(String, String)>,
}

impl Compactor {
    pub fn new(ctx: &Context) -> Self {
        let mut exact = HashMap::new();
        for (term, def) in ctx.terms() {
            if let Some(ref id) = def.id {
                exact.insert(id.clone(), term.clone());
            }
        }
        if let Some(ref vocab) = ctx.vocab {
            exact.insert(vocab.clone(), VOCAB.to_string());
        }
        if let Some(ref base) = ctx.base {
            exact.insert(base.clone(), BASE.to_string());
        }

        let mut prefixes: Vec<(String, String)> = exact
            .iter()
            .filter(|(iri, _)| iri.ends_with('/') || iri.ends_with('#'))
            .map(|(iri, term)| (iri.clone(), term.clone()))
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { exact, prefixes }
    }

    /// Compact an IRI using vocab rules (property names, `@type` values).
    pub fn vocab(&self, iri: &str) -> String {
        self.compact(iri, true)
    }

    /// Compact an IRI in an `@id` position. `@vocab` must not shorten node
    /// identifiers; only explicit prefixes and `@base` apply.
    pub fn id(&self, iri: &str) -> String {
        self.compact(iri, false)
    }

    /// Exact match → longest prefix → return as-is.
    fn compact(&self, iri: &str, allow_vocab: bool) -> String {
        if let Some(term) = self.exact.get(iri) {
            if term != VOCAB && term != BASE {
                return term.clone();
            }
        }
        for (prefix_iri, name) in &self.prefixes {
            if let Some(suffix) = iri.strip_prefix(prefix_iri.as_str()) {
                if name == VOCAB {
                    if allow_vocab {
                        return suffix.to_string();
                    }
                    continue;
                }
                if name == BASE {
                    return suffix.to_string();
                }
                return format!("{name}:{suffix}");
            }
        }
        iri.to_string()
    }
}

/// Compact an expanded document against a context.
///
/// With `graph` set, the result is framed as a single-element `@graph` and
/// unwrapped back to that element; a multi-node input stays wrapped under
/// `@graph`.
pub fn document(expanded: &Value, ctx: &Context, graph: bool) -> Result<Value> {
    let compactor = Compactor::new(ctx);
    match expanded {
        Value::Object(map) => Ok(Value::Object(compact_node(map, ctx, &compactor)?)),
        Value::Array(items) => {
            let nodes: Result<Vec<Value>> = items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(Value::Object(compact_node(map, ctx, &compactor)?)),
                    other => Err(JsonLdError::Unexpected {
                        message: format!("expected a node object in graph, got {other}"),
                    }),
                })
                .collect();
            let mut nodes = nodes?;
            if nodes.len() == 1 {
                Ok(nodes.remove(0))
            } else if graph {
                Ok(json!({"@graph": nodes}))
            } else {
                Ok(Value::Array(nodes))
            }
        }
        other => Err(JsonLdError::Unexpected {
            message: format!("cannot compact a non-object document: {other}"),
        }),
    }
}

fn compact_node(
    map: &Map<String, Value>,
    ctx: &Context,
    compactor: &Compactor,
) -> Result<Map<String, Value>> {
    let mut result = Map::new();

    for (key, value) in map {
        if key == "@id" {
            if let Some(s) = value.as_str() {
                result.insert("@id".to_string(), json!(compactor.id(s)));
            }
            continue;
        }

        if key == "@type" {
            let compacted: Vec<Value> = match value {
                Value::Array(arr) => arr
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| json!(compactor.vocab(s)))
                    .collect(),
                Value::String(s) => vec![json!(compactor.vocab(s))],
                _ => vec![],
            };
            result.insert("@type".to_string(), unwrap_single(compacted, false));
            continue;
        }

        if key == "@graph" {
            let nodes: Result<Vec<Value>> = value
                .as_array()
                .into_iter()
                .flatten()
                .map(|item| match item {
                    Value::Object(m) => Ok(Value::Object(compact_node(m, ctx, compactor)?)),
                    other => Ok(other.clone()),
                })
                .collect();
            result.insert("@graph".to_string(), Value::Array(nodes?));
            continue;
        }

        let short = compactor.vocab(key);
        let term = ctx.get(&short);
        let declared_type = term.and_then(|t| t.type_.as_ref());
        let container = term.and_then(|t| t.container);

        let items: Vec<Value> = match value {
            Value::Array(arr) => arr
                .iter()
                .map(|item| compact_element(item, declared_type, container, ctx, compactor))
                .collect::<Result<_>>()?,
            other => vec![compact_element(
                other,
                declared_type,
                container,
                ctx,
                compactor,
            )?],
        };

        let keep_array = container.is_some();
        result.insert(short, unwrap_single(items, keep_array));
    }

    Ok(result)
}

fn compact_element(
    value: &Value,
    declared_type: Option<&TermType>,
    container: Option<Container>,
    ctx: &Context,
    compactor: &Compactor,
) -> Result<Value> {
    let Value::Object(map) = value else {
        return Ok(value.clone());
    };

    // Value object: collapse to the plain value when the term's declared
    // datatype already covers the annotation.
    if let Some(inner) = map.get("@value") {
        let value_type = map.get("@type").and_then(|t| t.as_str());
        match value_type {
            None => return Ok(inner.clone()),
            Some(t) => {
                if declared_type == Some(&TermType::Iri(t.to_string())) {
                    return Ok(inner.clone());
                }
                return Ok(json!({"@value": inner, "@type": compactor.vocab(t)}));
            }
        }
    }

    // Node reference: collapse to a compact IRI string for @id-typed terms.
    if map.len() == 1 {
        if let Some(id) = map.get("@id").and_then(|v| v.as_str()) {
            if declared_type == Some(&TermType::Id) {
                return Ok(json!(compactor.id(id)));
            }
            return Ok(json!({"@id": compactor.id(id)}));
        }
    }

    // List object: collapse to a plain array for @list-container terms.
    if let Some(Value::Array(items)) = map.get("@list") {
        let compacted: Vec<Value> = items
            .iter()
            .map(|item| compact_element(item, declared_type, None, ctx, compactor))
            .collect::<Result<_>>()?;
        if container == Some(Container::List) {
            return Ok(Value::Array(compacted));
        }
        return Ok(json!({"@list": compacted}));
    }

    // Nested node.
    Ok(Value::Object(compact_node(map, ctx, compactor)?))
}

/// Single-element arrays unwrap to their element unless the term's container
/// keeps them as arrays.
fn unwrap_single(mut items: Vec<Value>, keep_array: bool) -> Value {
    if items.len() == 1 && !keep_array {
        items.remove(0)
    } else {
        Value::Array(items)
    }
}
