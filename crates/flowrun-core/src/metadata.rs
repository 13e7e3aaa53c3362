//! Fallible typed access to a node's metadata bag.
//!
//! Metadata is arbitrary JSON written by the editor. Handlers go through
//! these getters so a shape mismatch becomes a step-level `NodeError`
//! instead of a panic.

use serde_json::{Map, Value};

use crate::error::{NodeError, NodeResult};
use crate::types::Metadata;

/// Read a required array.
pub fn require_array<'a>(meta: &'a Metadata, key: &str) -> NodeResult<&'a [Value]> {
    match meta.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(NodeError::metadata(
            key,
            format!("expected an array, found {}", kind(other)),
        )),
        None => Err(NodeError::metadata(key, "missing")),
    }
}

/// Read a required object.
pub fn require_object<'a>(meta: &'a Metadata, key: &str) -> NodeResult<&'a Map<String, Value>> {
    match meta.get(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(NodeError::metadata(
            key,
            format!("expected an object, found {}", kind(other)),
        )),
        None => Err(NodeError::metadata(key, "missing")),
    }
}

/// Read an optional string. Absent or non-string values yield `None`.
pub fn optional_str<'a>(meta: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    meta.get(key).and_then(Value::as_str)
}

/// Numeric view of a JSON value. Integers and floats both count.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
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
    use serde_json::json;

    fn meta(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => Metadata::new(),
        }
    }

    #[test]
    fn test_require_array() {
        let m = meta(json!({"options": [1, 2], "name": "x"}));
        assert_eq!(require_array(&m, "options").unwrap().len(), 2);

        let err = require_array(&m, "name").unwrap_err();
        assert!(err.to_string().contains("expected an array, found a string"));

        let err = require_array(&m, "missing").unwrap_err();
        assert_eq!(err, NodeError::metadata("missing", "missing"));
    }

    #[test]
    fn test_require_object_and_optional_str() {
        let m = meta(json!({"emailTemplate": {"subject": "Hi", "body": 3}, "name": "x"}));
        let tmpl = require_object(&m, "emailTemplate").unwrap();
        assert_eq!(optional_str(tmpl, "subject"), Some("Hi"));
        assert!(optional_str(tmpl, "body").is_none());

        let err = require_object(&m, "name").unwrap_err();
        assert!(err.to_string().contains("expected an object, found a string"));
    }

    #[test]
    fn test_as_number_accepts_ints_and_floats() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!(-33.8688)), Some(-33.8688));
        assert_eq!(as_number(&json!("12")), None);
    }
}
