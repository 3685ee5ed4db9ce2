//! Per-row transformation pipeline.
//!
//! Rows are mapped and normalized on a bounded rayon pool, one chunk at a
//! time: the chunk is transformed in parallel, then its results are written
//! in input order before the next chunk starts. That bounds in-flight work to
//! the pool size and guarantees output lines match input line order, with the
//! output handle written only by the orchestrating thread.

use crate::error::{ConvertError, Result};
use crate::normalize::Normalizer;
use crate::progress::ProgressObserver;
use crate::record;
use crate::schema::{ErrorPolicy, SchemaConfig};
use rayon::prelude::*;
use serde_json::Value;
use std::io::Write;

/// Rows transformed in parallel between two ordered writes.
pub(crate) const ROWS_PER_CHUNK: usize = 512;

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows successfully written.
    pub processed: usize,
    /// Rows skipped under [`ErrorPolicy::Skip`].
    pub skipped: usize,
    /// Total data rows seen.
    pub total: usize,
}

/// Orchestrates RecordMapper → JsonLdNormalizer → serialization over all
/// rows of one input file.
pub struct RowPipeline<'a> {
    schema: &'a SchemaConfig,
    normalizer: &'a Normalizer,
    mapped_headers: &'a [Option<String>],
    tax_id: &'a str,
    observer: &'a dyn ProgressObserver,
    threads: Option<usize>,
}

impl<'a> RowPipeline<'a> {
    pub fn new(
        schema: &'a SchemaConfig,
        normalizer: &'a Normalizer,
        mapped_headers: &'a [Option<String>],
        tax_id: &'a str,
        observer: &'a dyn ProgressObserver,
        threads: Option<usize>,
    ) -> Self {
        Self {
            schema,
            normalizer,
            mapped_headers,
            tax_id,
            observer,
            threads,
        }
    }

    /// Transform every row and write one JSON line per record, in input
    /// order.
    ///
    /// `rows` pairs each raw line with its 1-based line number in the source
    /// file. Under [`ErrorPolicy::Abort`] the first row error ends the run;
    /// under [`ErrorPolicy::Skip`] failed rows are reported to the observer
    /// and counted in the summary.
    pub fn run(&self, rows: &[(usize, String)], out: &mut impl Write) -> Result<RunSummary> {
        let threads = self.threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ConvertError::Pool(e.to_string()))?;
        tracing::debug!(threads, total = rows.len(), "pipeline started");

        let total = rows.len();
        let mut summary = RunSummary {
            processed: 0,
            skipped: 0,
            total,
        };

        for chunk in rows.chunks(ROWS_PER_CHUNK) {
            let results: Vec<Result<String>> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|(line_no, line)| self.transform(*line_no, line))
                    .collect()
            });

            for result in results {
                match result {
                    Ok(json_line) => {
                        out.write_all(json_line.as_bytes())?;
                        out.write_all(b"\n")?;
                        summary.processed += 1;
                    }
                    Err(err) => match self.schema.error_policy {
                        ErrorPolicy::Abort => return Err(err),
                        ErrorPolicy::Skip => {
                            if let ConvertError::Row { line, ref source } = err {
                                self.observer.on_error(line, source);
                            }
                            summary.skipped += 1;
                        }
                    },
                }
            }

            let done = summary.processed + summary.skipped;
            self.observer.on_progress(done, total);
        }

        Ok(summary)
    }

    /// Map, normalize, and serialize one row. Key order in the output is
    /// deterministic: `serde_json`'s object map keeps keys sorted.
    fn transform(&self, line_no: usize, line: &str) -> Result<String> {
        let cells: Vec<&str> = line.trim_end_matches('\n').trim().split('\t').collect();

        let record = record::map_row(&cells, self.mapped_headers, self.schema, self.tax_id)
            .map_err(|e| e.at_line(line_no))?;

        let normalized = self
            .normalizer
            .normalize(record)
            .map_err(|e| e.at_line(line_no))?;

        serde_json::to_string(&Value::Object(normalized))
            .map_err(|e| ConvertError::from(e).at_line(line_no))
    }
}
