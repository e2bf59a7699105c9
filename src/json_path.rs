//! Optional-field path extraction over vendor JSON.
//!
//! Vendor payloads nest optional objects several levels deep and freely mix
//! `null`, missing keys and differently typed scalars. Every normalizer reads
//! through these helpers so that a missing intermediate key, a `null` or a
//! type mismatch all collapse to `None` instead of a panic.

use serde_json::Value;

/// Walk `keys` from `root`, returning the value at the end of the path.
///
/// Returns `None` if any segment is missing, is not an object, or is `null`.
pub fn path<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in keys {
        current = current.as_object()?.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

/// Read a string at `keys`. Numbers and booleans are stringified.
pub fn path_str(root: &Value, keys: &[&str]) -> Option<String> {
    path(root, keys).and_then(scalar_to_string)
}

/// Read a number at `keys`. Numeric strings such as `"120.50"` are accepted.
pub fn path_f64(root: &Value, keys: &[&str]) -> Option<f64> {
    path(root, keys).and_then(scalar_to_f64)
}

/// Read an array at `keys`, yielding an empty slice when absent.
pub fn path_array<'a>(root: &'a Value, keys: &[&str]) -> &'a [Value] {
    path(root, keys)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

/// Read the object at `keys`, or `null` when absent or not an object.
///
/// Handy for binding an intermediate object once and reading several fields
/// off it; every read from the fallback yields `None`.
pub fn path_obj<'a>(root: &'a Value, keys: &[&str]) -> &'a Value {
    path(root, keys).filter(|v| v.is_object()).unwrap_or(&NULL)
}

/// Read the first element of the array at `keys`, or `null`.
pub fn first<'a>(root: &'a Value, keys: &[&str]) -> &'a Value {
    path_array(root, keys).first().unwrap_or(&NULL)
}

static NULL: Value = Value::Null;

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_intermediate_key() {
        let v = json!({"data": {"parsed": {}}});
        assert!(path(&v, &["data", "parsed", "surname", "value"]).is_none());
        assert!(path_str(&v, &["nope", "deeper"]).is_none());
    }

    #[test]
    fn test_null_intermediate() {
        let v = json!({"data": {"parsed": null}});
        assert!(path(&v, &["data", "parsed", "surname"]).is_none());
    }

    #[test]
    fn test_non_object_intermediate() {
        let v = json!({"data": ["a", "b"]});
        assert!(path(&v, &["data", "parsed"]).is_none());
    }

    #[test]
    fn test_str_from_number() {
        let v = json!({"age": {"value": 42}});
        assert_eq!(path_str(&v, &["age", "value"]).as_deref(), Some("42"));
    }

    #[test]
    fn test_f64_from_string() {
        let v = json!({"amount": "120.50", "bad": "abc"});
        assert_eq!(path_f64(&v, &["amount"]), Some(120.5));
        assert_eq!(path_f64(&v, &["bad"]), None);
    }

    #[test]
    fn test_array_absent_is_empty() {
        let v = json!({"lines": null});
        assert!(path_array(&v, &["lines"]).is_empty());
        assert!(path_array(&v, &["missing"]).is_empty());
    }

    #[test]
    fn test_first() {
        let v = json!({"choices": [{"n": 1}, {"n": 2}], "empty": []});
        assert_eq!(path_f64(first(&v, &["choices"]), &["n"]), Some(1.0));
        assert!(first(&v, &["empty"]).is_null());
    }

    #[test]
    fn test_obj_fallback() {
        let v = json!({"address": {"value": "oops"}});
        let addr = path_obj(&v, &["address", "value"]);
        assert!(path_str(addr, &["city"]).is_none());
    }
}
