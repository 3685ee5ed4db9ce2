//! # tsv2jsonld
//!
//! A **batch conversion pipeline** that turns tab-separated molecular-
//! interaction tables into JSON-LD records for graph-based knowledge bases.
//! It runs to completion over a bounded input file: every row is parsed,
//! restructured into a semantic record, normalized through a JSON-LD
//! expand/compact round-trip, and written as one JSON line — optionally
//! re-wrapped into size-bounded `@graph` batch files.
//!
//! ## Key Features
//!
//! - **Total field parsing** - every cell maps to exactly one typed value;
//!   comma lists, `NA` nulls, and numeric coercion never fail
//! - **Data-driven restructuring** - identifier synthesis, evidence shaping,
//!   and participant fan-out are all configured per output schema
//! - **JSON-LD normalization** - records round-trip through a conformant
//!   expand/compact pair, with the `@context` pointer rewritten to a stable
//!   published URI
//! - **Parallel, order-preserving** - rows are transformed on a bounded
//!   rayon pool while output order always matches input order
//! - **Size-bounded batches** - optional `@graph` output files flushed at a
//!   configured byte threshold
//!
//! ## Quick Start
//!
//! ```ignore
//! use tsv2jsonld::*;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = SchemaConfig::default();
//! let mapping = convert::load_column_mapping("column_mapper/human.json")?;
//! let (raw_context, context) = convert::load_context("context.jsonld")?;
//! let table = taxonomy::load_table("taxonomy.json")?;
//!
//! let input = Path::new("data/complexes_human.tsv");
//! let (_, tax_id) = taxonomy::resolve(&table, "", input)?;
//!
//! let opts = convert::ConvertOptions {
//!     schema: &schema,
//!     column_mapping: &mapping,
//!     raw_context: &raw_context,
//!     context: &context,
//!     tax_id: &tax_id,
//!     observer: &LogProgress::default(),
//!     threads: None,
//!     batch_output: true,
//! };
//! let summary = convert::convert_file(input, Path::new("out/complexes_human.jsonl"), &opts)?;
//! println!("{} rows converted", summary.processed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`field`] - typed parsing of raw TSV cells
//! - [`record`] - row-to-record mapping and field restructuring
//! - [`jsonld`] - context parsing, URI expansion, expand/compact engine
//! - [`normalize`] - per-record JSON-LD normalization
//! - [`pipeline`] - parallel, order-preserving row pipeline
//! - [`batch`] - size-bounded `@graph` batch output
//! - [`convert`] - whole-file conversion driver
//! - [`taxonomy`] - taxonomy-id resolution
//! - [`fetch`] - source download and gzip decompression
//! - [`schema`] - per-schema configuration
//! - [`progress`] - injected progress/error observers

pub mod batch;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod field;
pub mod jsonld;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod schema;
pub mod taxonomy;

// General re-exports
pub use batch::BatchWriter;
pub use error::{ConvertError, Result};
pub use field::FieldValue;
pub use jsonld::Context;
pub use normalize::Normalizer;
pub use pipeline::{RowPipeline, RunSummary};
pub use progress::{LogProgress, NoopProgress, ProgressObserver};
pub use schema::{ErrorPolicy, EvidencePolicy, SchemaConfig};
