//! Row-to-record mapping and field restructuring.
//!
//! Turns one parsed TSV row into a semantic record: synthesizes the node id,
//! prefixes data-source and reference values, fans participant columns out
//! into `"<field>:<value>"` strings, and attaches the taxonomy id. All
//! restructuring rules come from [`SchemaConfig`].

use crate::error::{ConvertError, Result};
use crate::field::FieldValue;
use crate::schema::{EvidencePolicy, SchemaConfig};
use serde_json::{json, Map, Value};

/// Map a row of raw cells to a semantic record.
///
/// `mapped_headers` holds the canonical name per column, `None` for columns
/// the mapping drops. Fails when the configured node-id column is absent
/// after mapping.
pub fn map_row(
    cells: &[&str],
    mapped_headers: &[Option<String>],
    schema: &SchemaConfig,
    tax_id: &str,
) -> Result<Map<String, Value>> {
    // Parse and zip; unmapped columns drop here.
    let mut fields: Vec<(&str, FieldValue)> = Vec::with_capacity(cells.len());
    for (cell, header) in cells.iter().zip(mapped_headers) {
        if let Some(name) = header {
            fields.push((name.as_str(), FieldValue::parse(cell)));
        }
    }

    let id_value = fields
        .iter()
        .find(|(name, _)| *name == schema.node_id_column)
        .map(|(_, value)| value)
        .ok_or_else(|| ConvertError::MissingIdColumn {
            column: schema.node_id_column.clone(),
        })?;
    let id = synthesize_id(id_value);

    let mut record = Map::new();
    for (name, value) in &fields {
        record.insert((*name).to_string(), value.to_json());
    }

    record.insert("@id".to_string(), json!(format!("{}{id}", schema.node_id_prefix)));
    record.insert("@type".to_string(), json!(schema.node_type));
    record.insert(schema.label_field.clone(), json!(id));

    if let Some(pos) = find(&fields, &schema.data_source_field) {
        let prefixed = prefix_values(&fields[pos].1, &schema.data_source_prefix, true);
        record.insert(schema.data_source_field.clone(), prefixed);
    }

    if let Some(pos) = find(&fields, &schema.reference_field) {
        let prefixed = prefix_values(&fields[pos].1, &schema.reference_prefix, false);
        match schema.evidence_policy {
            EvidencePolicy::Nested => {
                record.remove(&schema.reference_field);
                let mut evidence = Map::new();
                evidence.insert(schema.reference_field.clone(), prefixed);
                record.insert(schema.evidence_field.clone(), Value::Object(evidence));
            }
            EvidencePolicy::Flat => {
                record.insert(schema.reference_field.clone(), prefixed);
            }
        }
    }

    restructure_participants(&mut record, &fields, schema);

    record.insert(
        schema.taxonomy_field.clone(),
        json!(format!("{}{tax_id}", schema.taxonomy_prefix)),
    );

    Ok(record)
}

/// Synthesize the node id: list values are stringified, sorted, and joined
/// with `-`; scalars are stringified directly.
fn synthesize_id(value: &FieldValue) -> String {
    match value {
        FieldValue::List(items) => {
            let mut parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
            parts.sort();
            parts.join("-")
        }
        scalar => scalar.to_string(),
    }
}

/// Prefix a value (fanning out over lists), optionally lower-casing first.
fn prefix_values(value: &FieldValue, prefix: &str, lowercase: bool) -> Value {
    let one = |v: &FieldValue| {
        let s = v.to_string();
        if lowercase {
            json!(format!("{prefix}{}", s.to_lowercase()))
        } else {
            json!(format!("{prefix}{s}"))
        }
    };
    match value {
        FieldValue::List(items) => Value::Array(items.iter().map(one).collect()),
        scalar => one(scalar),
    }
}

/// Fan participant columns out into `"<field>:<value>"` strings.
///
/// Columns absent from the mapped record are silently skipped — source
/// schemas are heterogeneous and not every file carries every participant
/// column. Columns in the literal subset stay in place as plain key/value
/// pairs. When the alternate id column is absent, the node-id column itself
/// becomes a participant; otherwise it is dropped from the flat record, its
/// value living on in `@id` and the label.
fn restructure_participants(
    record: &mut Map<String, Value>,
    fields: &[(&str, FieldValue)],
    schema: &SchemaConfig,
) {
    let mut targets: Vec<&str> = schema
        .participant_fields
        .iter()
        .map(String::as_str)
        .collect();

    let node_id_col = schema.node_id_column.as_str();
    let alt_present = schema
        .alt_id_column
        .as_deref()
        .is_some_and(|alt| record.contains_key(alt));
    if !alt_present && !targets.contains(&node_id_col) {
        targets.push(node_id_col);
    }
    if !targets.contains(&node_id_col) {
        record.remove(node_id_col);
    }

    let mut participants: Vec<Value> = Vec::new();
    for target in targets {
        if schema.literal_participant_fields.iter().any(|f| f == target) {
            continue;
        }
        let Some((_, value)) = fields.iter().find(|(name, _)| *name == target) else {
            continue;
        };
        value.for_each_scalar(&mut |scalar| {
            participants.push(json!(format!("{target}:{scalar}")));
        });
        record.remove(target);
    }

    record.insert(
        schema.participant_field.clone(),
        Value::Array(participants),
    );
}

fn find(fields: &[(&str, FieldValue)], name: &str) -> Option<usize> {
    fields.iter().position(|(n, _)| *n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(names: &[&str]) -> Vec<Option<String>> {
        names
            .iter()
            .map(|n| {
                if n.is_empty() {
                    None
                } else {
                    Some((*n).to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_basic_mapping() {
        let schema = SchemaConfig::default();
        let mapped = headers(&["uniprot_entry", "data_source", "reference"]);

        let record = map_row(&["P12345", "SRC1", "111"], &mapped, &schema, "9606").unwrap();

        assert_eq!(record["@id"], json!("cpdb:P12345"));
        assert_eq!(record["@type"], json!("m2r:MacromolecularComplex"));
        assert_eq!(record["label"], json!("P12345"));
        assert_eq!(record["data_source"], json!("http://identifiers.org/src1"));
        assert_eq!(record["evidence"], json!({"reference": "pmid:111"}));
        assert_eq!(record["taxonomy"], json!("taxid:9606"));
        // no alt id column: the entry column itself becomes the participant
        assert_eq!(record["participant"], json!(["uniprot_entry:P12345"]));
        assert!(!record.contains_key("uniprot_entry"));
        assert!(!record.contains_key("reference"));
    }

    #[test]
    fn test_id_synthesis_sorts_lists() {
        let schema = SchemaConfig::default();
        let mapped = headers(&["uniprot_entry", "data_source", "reference"]);

        let record = map_row(&["P1,P0", "SRC1", "111"], &mapped, &schema, "9606").unwrap();

        // sorted and hyphen-joined, independent of input order
        assert_eq!(record["@id"], json!("cpdb:P0-P1"));
        assert_eq!(record["label"], json!("P0-P1"));
        assert_eq!(
            record["participant"],
            json!(["uniprot_entry:P1", "uniprot_entry:P0"])
        );
    }

    #[test]
    fn test_missing_id_column_fails() {
        let schema = SchemaConfig::default();
        let mapped = headers(&["data_source", "reference"]);

        let err = map_row(&["SRC1", "111"], &mapped, &schema, "9606").unwrap_err();
        assert!(matches!(err, ConvertError::MissingIdColumn { .. }));
    }

    #[test]
    fn test_unmapped_columns_drop() {
        let schema = SchemaConfig::default();
        let mapped = headers(&["uniprot_entry", "", "data_source", "reference"]);

        let record = map_row(
            &["P12345", "ignored", "SRC1", "111"],
            &mapped,
            &schema,
            "9606",
        )
        .unwrap();
        assert!(!record.values().any(|v| v == &json!("ignored")));
    }

    #[test]
    fn test_list_fanout_for_sources_and_references() {
        let schema = SchemaConfig::default();
        let mapped = headers(&["uniprot_entry", "data_source", "reference"]);

        let record = map_row(&["P1", "SRC1,SRC2", "111,222"], &mapped, &schema, "9606").unwrap();

        assert_eq!(
            record["data_source"],
            json!([
                "http://identifiers.org/src1",
                "http://identifiers.org/src2"
            ])
        );
        assert_eq!(
            record["evidence"],
            json!({"reference": ["pmid:111", "pmid:222"]})
        );
    }

    #[test]
    fn test_flat_evidence_policy() {
        let mut schema = SchemaConfig::default();
        schema.evidence_policy = EvidencePolicy::Flat;
        let mapped = headers(&["uniprot_entry", "data_source", "reference"]);

        let record = map_row(&["P1", "SRC1", "111"], &mapped, &schema, "9606").unwrap();

        assert_eq!(record["reference"], json!("pmid:111"));
        assert!(!record.contains_key("evidence"));
    }

    #[test]
    fn test_alt_id_present_drops_entry_column() {
        let schema = SchemaConfig::default();
        let mapped = headers(&["uniprot_entry", "uniprot_id", "data_source", "reference"]);

        let record = map_row(&["P1", "Q1,Q2", "SRC1", "111"], &mapped, &schema, "9606").unwrap();

        // alt id column drives participants; the entry column is dropped
        assert_eq!(
            record["participant"],
            json!(["uniprot_id:Q1", "uniprot_id:Q2"])
        );
        assert!(!record.contains_key("uniprot_entry"));
        assert!(!record.contains_key("uniprot_id"));
    }

    #[test]
    fn test_absent_participant_column_skipped() {
        let mut schema = SchemaConfig::default();
        schema
            .participant_fields
            .push("interactor_b".to_string());
        let mapped = headers(&["uniprot_entry", "uniprot_id", "data_source", "reference"]);

        // interactor_b never appears in the mapped headers: no error
        let record = map_row(&["P1", "Q1", "SRC1", "111"], &mapped, &schema, "9606").unwrap();
        assert_eq!(record["participant"], json!(["uniprot_id:Q1"]));
    }

    #[test]
    fn test_literal_participant_passthrough() {
        let mut schema = SchemaConfig::default();
        schema.participant_fields.push("confidence".to_string());
        schema
            .literal_participant_fields
            .push("confidence".to_string());
        let mapped = headers(&[
            "uniprot_entry",
            "uniprot_id",
            "confidence",
            "data_source",
            "reference",
        ]);

        let record = map_row(
            &["P1", "Q1", "0.95", "SRC1", "111"],
            &mapped,
            &schema,
            "9606",
        )
        .unwrap();

        // preserved as a plain key/value pair, not a "field:value" string
        assert_eq!(record["confidence"], json!(0.95));
        assert_eq!(record["participant"], json!(["uniprot_id:Q1"]));
    }

    #[test]
    fn test_id_column_fans_out_when_alt_id_unset() {
        let mut schema = SchemaConfig::default();
        schema.node_id_column = "complex_name".to_string();
        schema.alt_id_column = None;
        schema.participant_fields = vec![];
        let mapped = headers(&["complex_name", "data_source", "reference"]);

        let record = map_row(&["CPX-1", "SRC1", "111"], &mapped, &schema, "9606").unwrap();
        assert_eq!(record["participant"], json!(["complex_name:CPX-1"]));
    }

    #[test]
    fn test_participant_key_present_even_when_empty() {
        let mut schema = SchemaConfig::default();
        schema.participant_fields = vec![];
        let mapped = headers(&["uniprot_entry", "uniprot_id", "data_source", "reference"]);

        let record = map_row(&["P1", "Q1", "SRC1", "111"], &mapped, &schema, "9606").unwrap();
        // nothing fanned out, but the participant key is always emitted
        assert_eq!(record["participant"], json!([]));
        // a column no rule claims stays as a plain field
        assert_eq!(record["uniprot_id"], json!("Q1"));
    }
}
