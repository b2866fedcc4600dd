//! Helpers for pulling fields out of untyped Connect payloads.
//!
//! Connect responses are deeply nested and shift shape between firmware
//! and service versions, so the mappers work over `serde_json::Value`
//! and treat every field as optional.

use serde_json::Value;

/// Navigation helpers for untyped JSON.
pub trait ValueExt {
    /// Follows a dot-separated path of object keys.
    fn at(&self, path: &str) -> Option<&Value>;

    /// Clones the value at `path`, or `Null` when any segment is missing.
    fn raw(&self, path: &str) -> Value;

    fn f64_at(&self, path: &str) -> Option<f64>;

    fn i64_at(&self, path: &str) -> Option<i64>;

    fn str_at(&self, path: &str) -> Option<&str>;
}

impl ValueExt for Value {
    fn at(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |node, key| node.get(key))
    }

    fn raw(&self, path: &str) -> Value {
        self.at(path).cloned().unwrap_or(Value::Null)
    }

    fn f64_at(&self, path: &str) -> Option<f64> {
        self.at(path).and_then(Value::as_f64)
    }

    fn i64_at(&self, path: &str) -> Option<i64> {
        self.at(path).and_then(Value::as_i64)
    }

    fn str_at(&self, path: &str) -> Option<&str> {
        self.at(path).and_then(Value::as_str)
    }
}

/// True when a payload carries nothing worth mapping: JSON null, an
/// empty object, or an empty array.
pub fn no_data(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
