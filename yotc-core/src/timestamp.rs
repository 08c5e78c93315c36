//! Coercion of stored timestamp values.
//!
//! Documents written by older clients carry timestamps in several shapes:
//! RFC 3339 strings, `{ "seconds", "nanoseconds" }` objects as produced by the
//! managed database, or epoch milliseconds. Readers accept all three.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Converts a stored timestamp value into a UTC instant.
///
/// Returns `None` for `null`, unparseable strings, and any other shape.
#[must_use]
pub fn to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// Deserializes a timestamp leniently, substituting the current time when
/// the stored value is missing or unreadable.
///
/// # Errors
/// Only fails if the input is not valid JSON.
pub fn deserialize_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_timestamp(&value).unwrap_or_else(Utc::now))
}

/// Deserializes an optional timestamp; unreadable values become `None`.
///
/// # Errors
/// Only fails if the input is not valid JSON.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_timestamp(&value))
}
