//! Minimal JSON-LD processing.
//!
//! This module provides the narrow engine contract the pipeline needs:
//! - Context parsing ([`Context`])
//! - Compact-name expansion ([`Context::expand_curie`])
//! - Document expansion ([`expand::document`])
//! - Document compaction ([`compact::document`])
//!
//! Any standards-conformant expand/compact implementation satisfies the same
//! contract; the rest of the crate never reaches past these entry points.

pub mod compact;
pub mod context;
pub mod expand;

pub use compact::Compactor;
pub use context::{Container, Context, TermDef, TermType};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum JsonLdError {
    #[error("invalid context: {message}")]
    InvalidContext { message: String },

    #[error("unknown prefix '{prefix}'")]
    PrefixNotFound { prefix: String },

    #[error("nested arrays are not allowed in JSON-LD values (key '{key}')")]
    NestedSequence { key: String },

    #[error("unexpected document shape: {message}")]
    Unexpected { message: String },
}

pub type Result<T> = std::result::Result<T, JsonLdError>;

/// Parse a JSON-LD `@context` document.
///
/// Accepts either the bare context object or a document wrapping it under an
/// `@context` member.
pub fn parse_context(value: &Value) -> Result<Context> {
    Context::parse(value)
}
