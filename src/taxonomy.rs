//! Taxonomy-id resolution.
//!
//! The taxonomy table is a JSON object mapping taxonomy name to id. Lookup
//! is by explicit name when given, otherwise by substring match of each name
//! against the input filename.

use crate::error::{ConvertError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Load the taxonomy table from a JSON file.
pub fn load_table(path: impl AsRef<Path>) -> Result<BTreeMap<String, Value>> {
    let f = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

/// Resolve `(name, id)` for an input file.
///
/// With a non-empty `name`, the table entry must exist. With an empty name,
/// the first table entry whose name occurs in the input filename wins.
pub fn resolve(
    table: &BTreeMap<String, Value>,
    name: &str,
    input_path: &Path,
) -> Result<(String, String)> {
    if !name.is_empty() {
        let id = table.get(name).ok_or_else(|| ConvertError::TaxonomyLookup {
            query: name.to_string(),
        })?;
        let id = stringify(id);
        info!(taxonomy = name, id = %id, "taxonomy resolved");
        return Ok((name.to_string(), id));
    }

    let filename = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for (tax_name, id) in table {
        if filename.contains(tax_name.as_str()) {
            let id = stringify(id);
            info!(taxonomy = %tax_name, id = %id, "taxonomy matched from filename");
            return Ok((tax_name.clone(), id));
        }
    }

    Err(ConvertError::TaxonomyLookup { query: filename })
}

/// Ids may be stored as numbers or strings; either way they are attached to
/// records as text.
fn stringify(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> BTreeMap<String, Value> {
        serde_json::from_value(json!({
            "human": 9606,
            "mouse": 10090,
            "yeast": "559292"
        }))
        .unwrap()
    }

    #[test]
    fn test_explicit_name() {
        let (name, id) = resolve(&table(), "human", Path::new("whatever.tsv")).unwrap();
        assert_eq!(name, "human");
        assert_eq!(id, "9606");
    }

    #[test]
    fn test_filename_substring_match() {
        let (name, id) =
            resolve(&table(), "", Path::new("/data/complexes_mouse_v2.tsv")).unwrap();
        assert_eq!(name, "mouse");
        assert_eq!(id, "10090");
    }

    #[test]
    fn test_string_ids_pass_through() {
        let (_, id) = resolve(&table(), "yeast", Path::new("x.tsv")).unwrap();
        assert_eq!(id, "559292");
    }

    #[test]
    fn test_no_match_fails() {
        assert!(matches!(
            resolve(&table(), "", Path::new("complexes_fly.tsv")),
            Err(ConvertError::TaxonomyLookup { .. })
        ));
        assert!(matches!(
            resolve(&table(), "fly", Path::new("complexes_fly.tsv")),
            Err(ConvertError::TaxonomyLookup { .. })
        ));
    }
}
