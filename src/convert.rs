//! Whole-file conversion driver.
//!
//! Reads a TSV source, builds the header mapping, drives the row pipeline
//! over every data row, and optionally re-wraps the JSON Lines output into
//! size-bounded batch files.

use crate::batch;
use crate::error::Result;
use crate::jsonld::Context;
use crate::normalize::Normalizer;
use crate::pipeline::{RowPipeline, RunSummary};
use crate::progress::ProgressObserver;
use crate::schema::SchemaConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column mapping document: raw column name → canonical field name.
pub type ColumnMapping = BTreeMap<String, String>;

/// Load the column mapping for one taxonomy.
pub fn load_column_mapping(path: impl AsRef<Path>) -> Result<ColumnMapping> {
    let f = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

/// Load the JSON-LD context document, keeping both the raw `@context` value
/// (embedded into batch files) and its parsed form.
pub fn load_context(path: impl AsRef<Path>) -> Result<(Value, Context)> {
    let f = File::open(path.as_ref())?;
    let doc: Value = serde_json::from_reader(BufReader::new(f))?;
    let raw = doc.get("@context").cloned().unwrap_or(doc);
    let parsed = Context::parse(&raw).map_err(crate::error::ConvertError::Expansion)?;
    Ok((raw, parsed))
}

/// Options for a single-file conversion.
pub struct ConvertOptions<'a> {
    pub schema: &'a SchemaConfig,
    pub column_mapping: &'a ColumnMapping,
    pub raw_context: &'a Value,
    pub context: &'a Context,
    pub tax_id: &'a str,
    pub observer: &'a dyn ProgressObserver,
    /// Worker pool size; defaults to available parallelism.
    pub threads: Option<usize>,
    /// Also produce batch-mode `.jsonld` files next to the JSONL output.
    pub batch_output: bool,
}

/// Convert one TSV file to JSON Lines (and optionally batch files).
pub fn convert_file(
    input_path: &Path,
    output_path: &Path,
    opts: &ConvertOptions<'_>,
) -> Result<RunSummary> {
    info!(input = %input_path.display(), output = %output_path.display(), "converting");

    let schema = opts.schema;
    schema.validate_prefixes(opts.context)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // The whole file is read up front; the row total is known before the
    // pipeline starts.
    let reader = BufReader::new(File::open(input_path)?);
    let mut lines = reader.lines();

    // Skip leading metadata lines; the last skipped-region line is the
    // column header.
    for _ in 0..schema.header_rows.saturating_sub(1) {
        if lines.next().transpose()?.is_none() {
            return empty_run(output_path);
        }
    }
    let Some(header_line) = lines.next().transpose()? else {
        return empty_run(output_path);
    };

    let mapped_headers = map_headers(&header_line, schema, opts.column_mapping);
    tracing::debug!(
        mapped = mapped_headers.iter().flatten().count(),
        total = mapped_headers.len(),
        "header mapped"
    );

    let mut rows: Vec<(usize, String)> = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // 1-based line number in the source file, counting skipped headers.
        rows.push((schema.header_rows + offset + 1, line));
    }
    info!(rows = rows.len(), "input rows loaded");

    let normalizer = Normalizer::new(
        opts.context.clone(),
        schema.context_uri.clone(),
        schema.required_fields.clone(),
        schema.graph_compaction,
    );
    let pipeline = RowPipeline::new(
        schema,
        &normalizer,
        &mapped_headers,
        opts.tax_id,
        opts.observer,
        opts.threads,
    );

    let out = File::create(output_path)?;
    let mut writer = BufWriter::new(out);
    let summary = pipeline.run(&rows, &mut writer)?;
    writer.flush()?;

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        "conversion finished"
    );

    if opts.batch_output {
        let stem = batch_stem(output_path)?;
        let files = batch::rewrap_jsonl(
            output_path,
            &stem,
            opts.raw_context.clone(),
            schema.batch_max_bytes,
        )?;
        info!(files, "batch output written");
    }

    Ok(summary)
}

/// Strip the marker prefix from the header line, split on tab, and map each
/// raw column through the mapping document. Unmapped columns become `None`
/// and their cells drop during record mapping.
pub fn map_headers(
    header_line: &str,
    schema: &SchemaConfig,
    mapping: &ColumnMapping,
) -> Vec<Option<String>> {
    let line = header_line.trim_end_matches('\n');
    let line = line.strip_prefix(schema.header_prefix.as_str()).unwrap_or(line);
    line.split('\t')
        .map(|raw| mapping.get(raw).cloned())
        .collect()
}

/// Batch files live in a `<stem>_jsonld/` sibling directory, mirroring the
/// JSONL output name.
fn batch_stem(output_path: &Path) -> Result<PathBuf> {
    let base = output_path.with_extension("");
    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = base.with_file_name(format!("{name}_jsonld"));
    fs::create_dir_all(&dir)?;
    Ok(dir.join(name))
}

fn empty_run(output_path: &Path) -> Result<RunSummary> {
    // Nothing past the headers: still produce an (empty) output file.
    File::create(output_path)?;
    Ok(RunSummary {
        processed: 0,
        skipped: 0,
        total: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_headers_strips_marker() {
        let schema = SchemaConfig::default();
        let mapping: ColumnMapping = [
            ("uniprot_entry", "uniprot_entry"),
            ("data_source", "data_source"),
            ("reference", "reference"),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

        let mapped = map_headers("#  uniprot_entry\tdata_source\treference", &schema, &mapping);
        assert_eq!(
            mapped,
            vec![
                Some("uniprot_entry".to_string()),
                Some("data_source".to_string()),
                Some("reference".to_string()),
            ]
        );
    }

    #[test]
    fn test_map_headers_drops_unknown_columns() {
        let schema = SchemaConfig::default();
        let mapping: ColumnMapping = [("known".to_string(), "mapped".to_string())].into();

        let mapped = map_headers("#  known\tunknown", &schema, &mapping);
        assert_eq!(mapped, vec![Some("mapped".to_string()), None]);
    }
}
