// Accessors for raw remote API records.
//
// Remote payloads stay opaque JSON objects; the columns we project out are
// read leniently since field sets vary by platform.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// A raw entity record as returned by the remote API
pub type Payload = serde_json::Map<String, Value>;

/// The stable remote identifier, present on every well-formed record
pub fn uid(payload: &Payload) -> Option<&str> {
    payload.get("uid").and_then(Value::as_str)
}

pub fn str_field(payload: &Payload, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn bool_field(payload: &Payload, key: &str) -> Option<bool> {
    payload.get(key).and_then(Value::as_bool)
}

pub fn int_field(payload: &Payload, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}

/// Timestamps arrive either as RFC 3339 strings or epoch milliseconds
pub fn time_field(payload: &Payload, key: &str) -> Option<DateTime<Utc>> {
    match payload.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}
