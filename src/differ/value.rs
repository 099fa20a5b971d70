use serde::Serialize;
use toml::Value;

use crate::events;

/// Converts a leaf value into an event payload.
///
/// Values TOML cannot hold directly are still reported: integers above
/// `i64::MAX` become their decimal string, and absent values (`None`, unit)
/// become [`events::absent`]. Returns `None` only if the value cannot be
/// serialized at all.
pub(super) fn to_value<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    Value::try_from(value)
        .ok()
        .or_else(|| serde_json::to_value(value).ok().map(from_json))
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => events::absent(),
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => Value::Integer(i),
            (None, Some(u), _) => Value::String(u.to_string()),
            (None, None, Some(f)) => Value::Float(f),
            (None, None, None) => Value::String(n.to_string()),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        // Absent record fields are left out, as TOML does.
        serde_json::Value::Object(fields) => Value::Table(
            fields
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, from_json(v)))
                .collect(),
        ),
    }
}

/// Renders a mapping key as a table key.
///
/// Only scalar keys are supported; composite keys yield `None`.
pub(super) fn key_name<K: Serialize + ?Sized>(key: &K) -> Option<String> {
    match to_value(key)? {
        Value::String(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}
