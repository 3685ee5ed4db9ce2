//! Size-bounded batch output.
//!
//! Re-wraps JSON Lines output into numbered `.jsonld` files, each a single
//! `{"@context": ..., "@graph": [...]}` document. A batch closes once the
//! accumulated byte size of its input lines reaches the configured threshold
//! — input-line size is a proxy for output size, a deliberate approximation.

use crate::error::Result;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Accumulates normalized records and flushes them into numbered batch
/// files: `<stem>_001.jsonld`, `<stem>_002.jsonld`, ...
pub struct BatchWriter {
    /// Output path prefix; the index suffix and extension are appended.
    stem: PathBuf,
    /// Shared `@context` document embedded in every batch file.
    context: Value,
    /// Byte-size threshold that closes a batch.
    max_bytes: usize,
    records: Vec<Value>,
    current_bytes: usize,
    next_index: usize,
}

impl BatchWriter {
    pub fn new(stem: impl Into<PathBuf>, context: Value, max_bytes: usize) -> Self {
        Self {
            stem: stem.into(),
            context,
            max_bytes,
            records: Vec::new(),
            current_bytes: 0,
            next_index: 1,
        }
    }

    /// Append one serialized record line.
    ///
    /// The line is parsed, its `@context` pointer removed (the batch file
    /// carries the shared context once), and the batch flushed if the
    /// accumulated line bytes now reach the threshold.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        let mut record: Value = serde_json::from_str(line)?;
        if let Some(map) = record.as_object_mut() {
            map.remove("@context");
        }
        self.records.push(record);
        self.current_bytes += line.len();

        if self.current_bytes >= self.max_bytes {
            self.flush()?;
        }
        Ok(())
    }

    /// Write the current batch out as one `@graph` document and reset.
    pub fn flush(&mut self) -> Result<PathBuf> {
        let path = self
            .stem
            .with_file_name(format!(
                "{}_{:03}.jsonld",
                self.stem
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                self.next_index
            ));

        let doc = json!({
            "@context": self.context,
            "@graph": self.records,
        });
        let f = File::create(&path)?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &doc)?;
        w.flush()?;

        info!(entries = self.records.len(), path = %path.display(), "batch written");

        self.records.clear();
        self.current_bytes = 0;
        self.next_index += 1;
        Ok(path)
    }

    /// Flush any non-empty remainder. No records are ever dropped on close.
    pub fn finish(&mut self) -> Result<()> {
        if !self.records.is_empty() {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of batch files written so far.
    pub fn files_written(&self) -> usize {
        self.next_index - 1
    }
}

/// Re-read a JSON Lines file into batch-mode output files under `stem`.
pub fn rewrap_jsonl(
    jsonl_path: &Path,
    stem: &Path,
    context: Value,
    max_bytes: usize,
) -> Result<usize> {
    use std::io::{BufRead, BufReader};

    let f = File::open(jsonl_path)?;
    let reader = BufReader::new(f);

    let mut writer = BatchWriter::new(stem, context, max_bytes);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writer.append_line(&line)?;
    }
    writer.finish()?;
    Ok(writer.files_written())
}
