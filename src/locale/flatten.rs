//! Conversion between nested locale documents and dotted-path maps.
//!
//! `{"nav": {"cart": {"label": "Cart"}}}` <-> `{"nav.cart.label": "Cart"}`
//!
//! The dotted encoding cannot tell a nested path from a key that itself
//! contains a dot, so such keys are rejected instead of being guessed at.

use crate::error::LocaleError;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Single-level mapping from dotted path to string value, in document order.
pub type FlatLocaleMap = IndexMap<String, String>;

/// Flatten a nested document into dotted-path keys.
///
/// Strings are kept as-is, other primitives and arrays are stringified,
/// `null` leaves are dropped.
pub fn flatten(document: &Value) -> Result<FlatLocaleMap, LocaleError> {
    let mut result = FlatLocaleMap::new();
    match document {
        Value::Object(map) => flatten_into(map, "", &mut result)?,
        other => {
            return Err(LocaleError::Parse(format!(
                "expected a JSON object at the top level, found {}",
                kind(other)
            )))
        }
    }
    Ok(result)
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, result: &mut FlatLocaleMap) -> Result<(), LocaleError> {
    for (key, value) in map {
        validate_segment(key, prefix)?;

        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(child) => flatten_into(child, &path, result)?,
            Value::Null => {}
            Value::String(s) => {
                result.insert(path, s.clone());
            }
            other => {
                result.insert(path, other.to_string());
            }
        }
    }
    Ok(())
}

fn validate_segment(key: &str, prefix: &str) -> Result<(), LocaleError> {
    let full = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    };
    if key.is_empty() {
        return Err(LocaleError::InvalidKey {
            key: full,
            reason: "empty key".to_string(),
        });
    }
    if key.contains('.') {
        return Err(LocaleError::InvalidKey {
            key: full,
            reason: "keys must not contain '.'".to_string(),
        });
    }
    Ok(())
}

/// Rebuild the nested document from dotted-path keys.
pub fn unflatten(flat: &FlatLocaleMap) -> Result<Value, LocaleError> {
    let mut root = Map::new();

    for (path, value) in flat {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(LocaleError::InvalidKey {
                key: path.clone(),
                reason: "empty path segment".to_string(),
            });
        }

        let (leaf, parents) = segments
            .split_last()
            .expect("str::split always yields at least one segment");

        let mut current = &mut root;
        for segment in parents {
            let node = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match node {
                Value::Object(child) => child,
                _ => {
                    return Err(LocaleError::InvalidKey {
                        key: path.clone(),
                        reason: format!("'{}' is both a value and a group", segment),
                    })
                }
            };
        }

        if matches!(current.get(*leaf), Some(Value::Object(_))) {
            return Err(LocaleError::InvalidKey {
                key: path.clone(),
                reason: format!("'{}' is both a value and a group", leaf),
            });
        }
        current.insert(leaf.to_string(), Value::String(value.clone()));
    }

    Ok(Value::Object(root))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let doc = json!({"nav": {"cart": {"label": "Cart"}, "home": "Home"}, "title": "Shop"});
        let flat = flatten(&doc).unwrap();
        assert_eq!(flat.get("nav.cart.label").map(String::as_str), Some("Cart"));
        assert_eq!(flat.get("nav.home").map(String::as_str), Some("Home"));
        assert_eq!(flat.get("title").map(String::as_str), Some("Shop"));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_flatten_keeps_document_order() {
        let doc: Value = serde_json::from_str(r#"{"z": "1", "a": {"y": "2", "b": "3"}, "m": "4"}"#).unwrap();
        let keys: Vec<_> = flatten(&doc).unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a.y", "a.b", "m"]);
    }

    #[test]
    fn test_flatten_stringifies_primitives_and_arrays() {
        let doc = json!({"count": 3, "enabled": true, "ratio": 1.5, "list": ["a", "b"]});
        let flat = flatten(&doc).unwrap();
        assert_eq!(flat["count"], "3");
        assert_eq!(flat["enabled"], "true");
        assert_eq!(flat["ratio"], "1.5");
        assert_eq!(flat["list"], r#"["a","b"]"#);
    }

    #[test]
    fn test_flatten_drops_null() {
        let doc = json!({"a": null, "b": "x"});
        let flat = flatten(&doc).unwrap();
        assert!(!flat.contains_key("a"));
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn test_flatten_empty_object() {
        let flat = flatten(&json!({"a": {}})).unwrap();
        assert!(flat.is_empty());
    }

    #[test]
    fn test_flatten_rejects_dotted_key() {
        let result = flatten(&json!({"a": {"b.c": "x"}}));
        match result {
            Err(LocaleError::InvalidKey { key, .. }) => assert_eq!(key, "a.b.c"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_flatten_rejects_empty_key() {
        assert!(matches!(
            flatten(&json!({"": "x"})),
            Err(LocaleError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_flatten_rejects_non_object_root() {
        assert!(matches!(flatten(&json!(["a"])), Err(LocaleError::Parse(_))));
        assert!(matches!(flatten(&json!("text")), Err(LocaleError::Parse(_))));
    }

    #[test]
    fn test_unflatten_nested() {
        let mut flat = FlatLocaleMap::new();
        flat.insert("a.b".to_string(), "Hallo {{name}}".to_string());
        flat.insert("a.c".to_string(), "Welt".to_string());
        flat.insert("d".to_string(), "x".to_string());

        let doc = unflatten(&flat).unwrap();
        assert_eq!(doc, json!({"a": {"b": "Hallo {{name}}", "c": "Welt"}, "d": "x"}));
    }

    #[test]
    fn test_unflatten_rejects_empty_segment() {
        let mut flat = FlatLocaleMap::new();
        flat.insert("a..b".to_string(), "x".to_string());
        assert!(matches!(unflatten(&flat), Err(LocaleError::InvalidKey { .. })));
    }

    #[test]
    fn test_unflatten_rejects_leaf_then_group() {
        let mut flat = FlatLocaleMap::new();
        flat.insert("a".to_string(), "x".to_string());
        flat.insert("a.b".to_string(), "y".to_string());
        assert!(matches!(unflatten(&flat), Err(LocaleError::InvalidKey { .. })));
    }

    #[test]
    fn test_unflatten_rejects_group_then_leaf() {
        let mut flat = FlatLocaleMap::new();
        flat.insert("a.b".to_string(), "y".to_string());
        flat.insert("a".to_string(), "x".to_string());
        assert!(matches!(unflatten(&flat), Err(LocaleError::InvalidKey { .. })));
    }

    #[test]
    fn test_unflatten_empty() {
        assert_eq!(unflatten(&FlatLocaleMap::new()).unwrap(), json!({}));
    }

    fn locale_document() -> impl Strategy<Value = Value> {
        let leaf = "[a-zA-Z {}!]{0,12}".prop_map(Value::String);
        leaf.prop_recursive(4, 32, 5, |inner| {
            proptest::collection::btree_map("[a-z_]{1,6}", inner, 1..5)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }

    proptest! {
        #[test]
        fn prop_unflatten_inverts_flatten(
            doc in proptest::collection::btree_map("[a-z_]{1,6}", locale_document(), 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        ) {
            // Empty groups have no flat representation
            fn strip_empty(value: &Value) -> Option<Value> {
                match value {
                    Value::Object(map) => {
                        let kept: Map<String, Value> = map
                            .iter()
                            .filter_map(|(k, v)| strip_empty(v).map(|v| (k.clone(), v)))
                            .collect();
                        if kept.is_empty() { None } else { Some(Value::Object(kept)) }
                    }
                    other => Some(other.clone()),
                }
            }

            let flat = flatten(&doc).unwrap();
            let rebuilt = unflatten(&flat).unwrap();
            let expected = strip_empty(&doc).unwrap_or_else(|| Value::Object(Map::new()));
            prop_assert_eq!(rebuilt, expected);
        }

        #[test]
        fn prop_flatten_inverts_unflatten(
            entries in proptest::collection::btree_map("[a-z]{1,4}(\\.[a-z]{1,4}){0,2}", "[a-zA-Z ]{0,10}", 0..10)
        ) {
            let flat: FlatLocaleMap = entries.into_iter().collect();
            // Only maps without leaf/group collisions are valid flat maps
            if let Ok(doc) = unflatten(&flat) {
                let mut again = flatten(&doc).unwrap();
                again.sort_keys();
                let mut expected = flat.clone();
                expected.sort_keys();
                prop_assert_eq!(again, expected);
            }
        }
    }
}
