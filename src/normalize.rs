//! JSON-LD normalization of semantic records.
//!
//! Runs each record through an expand/compact round-trip against the run's
//! context, verifies the compacted shape, and rewrites `@context` to the
//! stable published URI so output documents never embed the local working
//! copy of the context file.

use crate::error::{ConvertError, Result};
use crate::jsonld::{compact, expand, Context};
use serde_json::{json, Map, Value};

/// Per-run normalizer; immutable and shared read-only across workers.
#[derive(Debug, Clone)]
pub struct Normalizer {
    context: Context,
    /// Published URI written as `@context` in every output record.
    context_uri: String,
    /// Fields re-inserted as null when normalization drops them.
    required_fields: Vec<String>,
    /// Compact through a single-element `@graph` frame.
    graph: bool,
}

impl Normalizer {
    pub fn new(
        context: Context,
        context_uri: impl Into<String>,
        required_fields: Vec<String>,
        graph: bool,
    ) -> Self {
        Self {
            context,
            context_uri: context_uri.into(),
            required_fields,
            graph,
        }
    }

    /// Normalize one semantic record.
    ///
    /// The compacted result must be a single JSON object; anything else fails
    /// with [`ConvertError::UnexpectedShape`] rather than being silently
    /// replaced. Required fields dropped by normalization (values the context
    /// cannot type) come back as explicit nulls — documented recovery, not
    /// silent data loss.
    pub fn normalize(&self, record: Map<String, Value>) -> Result<Map<String, Value>> {
        let doc = Value::Object(record);

        let expanded =
            expand::document(&doc, &self.context).map_err(ConvertError::Expansion)?;

        let compacted = compact::document(&expanded, &self.context, self.graph)
            .map_err(ConvertError::Compaction)?;

        let mut out = match compacted {
            Value::Object(map) => map,
            Value::Array(_) => return Err(ConvertError::UnexpectedShape { kind: "array" }),
            _ => return Err(ConvertError::UnexpectedShape { kind: "scalar" }),
        };

        out.insert("@context".to_string(), json!(self.context_uri));

        for field in &self.required_fields {
            if !out.contains_key(field) {
                out.insert(field.clone(), Value::Null);
            }
        }

        Ok(out)
    }
}
