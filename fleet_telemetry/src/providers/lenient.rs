//! Forgiving field deserializers for third-party payloads.
//!
//! Upstream records are best-effort: a field holding the wrong JSON type is
//! treated as absent rather than failing the whole record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Strings pass through; numbers are rendered; anything else is absent.
pub fn string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers pass through; numeric strings are parsed; anything else is absent.
pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// RFC 3339 strings become instants; anything else is absent.
pub fn datetime<'de, D: Deserializer<'de>>(de: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => parse_datetime(&s),
        _ => None,
    })
}

/// Keeps the object elements of an array that parse as `T`. A non-array
/// value yields an empty list.
pub fn objects<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(object_from_value).collect(),
        _ => Vec::new(),
    })
}

/// Parses a nested object as `T`; a non-object or mismatched value is absent.
pub fn object<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(de)?.and_then(object_from_value))
}

/// Parses `value` as `T` only if it is a JSON object.
pub fn object_from_value<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_object() {
        serde_json::from_value(value).ok()
    } else {
        None
    }
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
