//! JSON corpus output
//!
//! Each corpus is serialized to pretty-printed JSON. A small post-pass
//! strips tab characters from every string value before writing; deeper
//! text normalization is left to downstream consumers.

use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Serializes a record collection to a JSON file
pub fn write_corpus<T: Serialize>(path: &Path, records: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut value = serde_json::to_value(records)?;
    clean_strings(&mut value);
    fs::write(path, serde_json::to_string_pretty(&value)?)?;

    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Recursively strips tab characters from every string in the tree
fn clean_strings(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains('\t') {
                *s = s.replace('\t', "");
            }
        }
        Value::Array(items) => items.iter_mut().for_each(clean_strings),
        Value::Object(map) => map.values_mut().for_each(clean_strings),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tabs_stripped_recursively() {
        let mut value = json!({
            "title": "A\ttitle",
            "content": [{ "text": "line\tone" }, { "text": "clean" }],
            "count": 3
        });
        clean_strings(&mut value);
        assert_eq!(value["title"], "Atitle");
        assert_eq!(value["content"][0]["text"], "lineone");
        assert_eq!(value["content"][1]["text"], "clean");
        assert_eq!(value["count"], 3);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_corpus(&path, &vec!["a", "b"]).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, json!(["a", "b"]));
    }
}
