//! Typed parsing of raw TSV cell text.
//!
//! Every cell is parsed into a [`FieldValue`] — parsing is total and never
//! fails. Comma-separated cells become lists (each piece parsed recursively),
//! the literal `NA` becomes null, and numeric parses are attempted before
//! falling back to the original text.

use serde_json::{Number, Value};
use std::fmt;

/// A parsed cell value.
///
/// List-vs-scalar handling is done once here, by matching, instead of being
/// re-checked at every restructuring site.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Parse raw cell text.
    ///
    /// The comma check runs first, so `"NA,NA"` is a list of two nulls, not
    /// null. `"NA"` is null. Otherwise an integer parse is tried, then a
    /// float parse, then the text is kept unchanged.
    pub fn parse(field: &str) -> FieldValue {
        if field.contains(',') {
            return FieldValue::List(field.split(',').map(FieldValue::parse).collect());
        }
        if field == "NA" {
            return FieldValue::Null;
        }
        if let Ok(i) = field.parse::<i64>() {
            return FieldValue::Int(i);
        }
        if let Ok(f) = field.parse::<f64>() {
            return FieldValue::Float(f);
        }
        FieldValue::Text(field.to_string())
    }

    /// Fan out over list values; scalars visit once.
    pub fn for_each_scalar(&self, f: &mut impl FnMut(&FieldValue)) {
        match self {
            FieldValue::List(items) => {
                for item in items {
                    item.for_each_scalar(f);
                }
            }
            other => f(other),
        }
    }

    /// Convert into a JSON value for record assembly.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Int(i) => Value::Number((*i).into()),
            FieldValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
        }
    }
}

impl fmt::Display for FieldValue {
    /// Plain-string form used for identifier synthesis and prefixing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NA"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
