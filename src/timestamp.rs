//! Fixed-width timestamps for stored and served documents.
//!
//! Filters and sorts compare timestamps as JSON strings, so every timestamp
//! is written as `YYYY-MM-DDTHH:MM:SS.sssZ` and held at millisecond
//! precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Drops precision below one millisecond.
#[must_use]
pub fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp)
}

/// Renders a timestamp in the document format.
#[must_use]
pub fn to_wire(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialises a timestamp in the document format.
///
/// # Errors
///
/// Returns the serializer's error.
pub fn serialize<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_wire(timestamp))
}

/// Deserialises an RFC 3339 timestamp, truncated to milliseconds.
///
/// # Errors
///
/// Returns the deserializer's error for non-RFC 3339 input.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    DateTime::<Utc>::deserialize(deserializer).map(truncate_to_millis)
}
