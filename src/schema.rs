//! Output-schema configuration.
//!
//! Field restructuring rules (identifier synthesis, evidence shaping,
//! participant fan-out) vary between output schemas, so they are data rather
//! than code: a [`SchemaConfig`] is loaded per run, with defaults matching
//! the macromolecular-complex schema.

use crate::error::{ConvertError, Result};
use crate::jsonld::{Context, JsonLdError};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// How the reference/evidence column is re-emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidencePolicy {
    /// Pop the reference column and nest it: `evidence: {reference: ...}`.
    Nested,
    /// Keep the reference column flat, values prefixed in place.
    Flat,
}

/// What to do when a row fails to map or normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the whole run on the first row error (reference behavior).
    Abort,
    /// Record the row as failed, continue, and report a summary at the end.
    Skip,
}

/// Per-schema conversion settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Leading lines (metadata plus the header itself) before data rows.
    pub header_rows: usize,
    /// Marker prefix stripped from the header line before splitting on tab.
    pub header_prefix: String,

    /// Column whose value drives node-id synthesis.
    pub node_id_column: String,
    /// Alternate id column; when absent from a record, the node-id column is
    /// restructured as a participant instead of being dropped.
    pub alt_id_column: Option<String>,
    /// Prefix prepended to the synthesized id to form `@id`.
    pub node_id_prefix: String,
    /// Fixed `@type` assigned to every record.
    pub node_type: String,
    /// Field receiving the human-readable copy of the synthesized id.
    pub label_field: String,

    /// Data-source column; values are lower-cased and prefixed.
    pub data_source_field: String,
    pub data_source_prefix: String,

    /// Reference column and its URI prefix (e.g. PubMed ids).
    pub reference_field: String,
    pub reference_prefix: String,
    /// Nested vs. flat evidence shaping; explicit, never inferred.
    pub evidence_policy: EvidencePolicy,
    /// Key the nested evidence object is emitted under.
    pub evidence_field: String,

    /// Ordered participant columns, restructured into `"<field>:<value>"`
    /// strings under the participant field.
    pub participant_fields: Vec<String>,
    /// Participant columns preserved as plain key/value pairs instead.
    pub literal_participant_fields: Vec<String>,
    pub participant_field: String,

    /// Taxonomy field and the prefix applied to the taxonomy id.
    pub taxonomy_field: String,
    pub taxonomy_prefix: String,

    /// Fields re-inserted as null when JSON-LD normalization drops them.
    pub required_fields: Vec<String>,

    /// Stable published URI written as `@context` in every output record.
    pub context_uri: String,

    /// Compact the record through a single-element `@graph` frame.
    pub graph_compaction: bool,

    /// Byte-size threshold for batch-mode output files.
    pub batch_max_bytes: usize,

    /// Row error handling.
    pub error_policy: ErrorPolicy,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            header_rows: 2,
            header_prefix: "#  ".to_string(),
            node_id_column: "uniprot_entry".to_string(),
            alt_id_column: Some("uniprot_id".to_string()),
            node_id_prefix: "cpdb:".to_string(),
            node_type: "m2r:MacromolecularComplex".to_string(),
            label_field: "label".to_string(),
            data_source_field: "data_source".to_string(),
            data_source_prefix: "http://identifiers.org/".to_string(),
            reference_field: "reference".to_string(),
            reference_prefix: "pmid:".to_string(),
            evidence_policy: EvidencePolicy::Nested,
            evidence_field: "evidence".to_string(),
            participant_fields: vec!["uniprot_id".to_string()],
            literal_participant_fields: Vec::new(),
            participant_field: "participant".to_string(),
            taxonomy_field: "taxonomy".to_string(),
            taxonomy_prefix: "taxid:".to_string(),
            required_fields: vec!["participant".to_string()],
            context_uri: "http://example.com/context.jsonld".to_string(),
            graph_compaction: false,
            batch_max_bytes: 3 * 1024 * 1024,
            error_policy: ErrorPolicy::Abort,
        }
    }
}

impl SchemaConfig {
    /// Load a schema configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(f))?)
    }

    /// Fail fast when a configured compact prefix is not resolvable in the
    /// context, instead of surfacing it mid-run.
    ///
    /// Absolute prefixes (containing `://`) pass through unchanged.
    pub fn validate_prefixes(&self, ctx: &Context) -> Result<()> {
        for prefix in [
            &self.node_id_prefix,
            &self.reference_prefix,
            &self.taxonomy_prefix,
            &self.data_source_prefix,
        ] {
            let bare = prefix.trim_end_matches(':');
            if bare.is_empty() {
                continue;
            }
            ctx.expand_curie(bare).map_err(|e| match e {
                JsonLdError::PrefixNotFound { prefix } => ConvertError::PrefixNotFound { prefix },
                other => ConvertError::Expansion(other),
            })?;
        }
        Ok(())
    }
}
