//! Nested JSON values flattened for query strings and attribute lists.

use serde_json::Value;

/// Collapse a nested object into bracketed keys.
///
/// ```text
/// {"a": {"b": {"c": 1}}, "tags": ["x", "y"]}
///   → a[b][c]=1, tags[]=x, tags[]=y
/// ```
///
/// Arrays of scalars use empty brackets so they round-trip through
/// [`crate::util::url::Url`] as lists; arrays holding containers are
/// indexed. A top-level scalar collapses to a single pair with an empty key.
pub fn collapse_keys(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collapse_into(key.clone(), child, &mut out);
            }
        }
        other => collapse_into(String::new(), other, &mut out),
    }
    out
}

fn collapse_into(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collapse_into(format!("{prefix}[{key}]"), child, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    collapse_into(format!("{prefix}[{i}]"), item, out);
                } else {
                    out.push((format!("{prefix}[]"), scalar(item)));
                }
            }
        }
        scalar_value => out.push((prefix, scalar(scalar_value))),
    }
}

/// String form of a scalar JSON value. Null is empty.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// All leaf values in document order, with arrays and objects unwrapped.
pub fn flatten(value: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    out
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| flatten_into(item, out)),
        Value::Object(map) => map.values().for_each(|item| flatten_into(item, out)),
        leaf => out.push(leaf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn collapses_nested_objects() {
        let value = json!({"a": {"b": {"c": 1}}, "flag": true, "none": null});
        assert_eq!(
            collapse_keys(&value),
            pairs(&[("a[b][c]", "1"), ("flag", "true"), ("none", "")])
        );
    }

    #[test]
    fn scalar_arrays_use_empty_brackets() {
        let value = json!({"tags": ["x", "y"], "rows": [{"id": 3}]});
        assert_eq!(
            collapse_keys(&value),
            pairs(&[("tags[]", "x"), ("tags[]", "y"), ("rows[0][id]", "3")])
        );
    }

    #[test]
    fn flattens_in_document_order() {
        let value = json!([1, [2, [3]], {"k": "v", "n": [4]}]);
        let leaves: Vec<String> = flatten(&value).into_iter().map(scalar).collect();
        assert_eq!(leaves, ["1", "2", "3", "v", "4"]);
    }
}
