//! JSON extraction: flatten nested structure into searchable key paths.

use crate::error::{ExtractError, ExtractResult};
use crate::Extraction;

/// Parse JSON bytes and flatten them into one `path: value` line per
/// leaf, so nested values remain searchable (e.g. `a.b.c: value`,
/// `items[0].name: widget`).
pub fn extract(bytes: &[u8]) -> ExtractResult<Extraction> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ExtractError::malformed(format!("invalid JSON: {}", e)))?;

    let mut lines = Vec::new();
    flatten("", &value, &mut lines);

    let keys = lines.len();
    Ok(Extraction::new(lines.join("\n")).with_metadata("keys", serde_json::json!(keys)))
}

fn flatten(path: &str, value: &serde_json::Value, lines: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten(&child_path, child, lines);
            }
            // An empty object still marks the key's presence
            if map.is_empty() && !path.is_empty() {
                lines.push(format!("{}: {{}}", path));
            }
        }
        serde_json::Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", path, index), child, lines);
            }
            if items.is_empty() && !path.is_empty() {
                lines.push(format!("{}: []", path));
            }
        }
        serde_json::Value::String(s) => lines.push(format!("{}: {}", path, s)),
        other => lines.push(format!("{}: {}", path, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_objects() {
        let extraction = extract(br#"{"a": {"b": {"c": "value"}}}"#).unwrap();
        assert_eq!(extraction.text, "a.b.c: value");
        assert_eq!(extraction.metadata["keys"], serde_json::json!(1));
    }

    #[test]
    fn test_flatten_arrays_and_scalars() {
        let extraction =
            extract(br#"{"items": [{"name": "widget", "qty": 2}], "done": true}"#).unwrap();

        assert!(extraction.text.contains("items[0].name: widget"));
        assert!(extraction.text.contains("items[0].qty: 2"));
        assert!(extraction.text.contains("done: true"));
    }

    #[test]
    fn test_top_level_scalar() {
        let extraction = extract(br#""just a string""#).unwrap();
        assert_eq!(extraction.text, ": just a string");
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = extract(b"{not json").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed { .. }));
    }
}
