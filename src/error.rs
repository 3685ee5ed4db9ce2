//! Error types for the conversion pipeline.

use crate::jsonld::JsonLdError;
use thiserror::Error;

/// Error type for mapping, normalization, and run-level failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The configured node-id column was not present after header mapping.
    #[error("record is missing required id column '{column}'")]
    MissingIdColumn { column: String },

    /// A compact name used a prefix that the context does not define.
    #[error("unknown URI prefix '{prefix}'")]
    PrefixNotFound { prefix: String },

    /// JSON-LD expansion failed.
    #[error("JSON-LD expansion failed: {0}")]
    Expansion(#[source] JsonLdError),

    /// JSON-LD compaction failed.
    #[error("JSON-LD compaction failed: {0}")]
    Compaction(#[source] JsonLdError),

    /// Compaction produced something other than a single JSON object.
    #[error("JSON-LD compaction produced a {kind}, expected a single object")]
    UnexpectedShape { kind: &'static str },

    /// No entry in the taxonomy table matched the requested name or filename.
    #[error("no taxonomy entry matches '{query}'")]
    TaxonomyLookup { query: String },

    /// A row failed; wraps the underlying error with the 1-based source line.
    #[error("line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: Box<ConvertError>,
    },

    /// The worker pool could not be constructed.
    #[error("worker pool: {0}")]
    Pool(String),

    /// Downloading a source file failed.
    #[error("download {url}: {message}")]
    Download { url: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Attach a 1-based source line number to a row-scoped error.
    pub fn at_line(self, line: usize) -> ConvertError {
        ConvertError::Row {
            line,
            source: Box::new(self),
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
