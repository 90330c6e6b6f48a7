//! Deadline values accepted from clients.

use super::TaskDomainError;
use crate::timestamp::truncate_to_millis;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw deadline as sent by a client: epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeadlineInput {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// RFC 3339 timestamp, `YYYY-MM-DD` date, naive `YYYY-MM-DDTHH:MM:SS`
    /// (read as UTC), or a decimal millisecond count.
    Text(String),
}

impl DeadlineInput {
    /// Resolves the input to a UTC timestamp at millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDeadline`] when the value cannot be
    /// interpreted.
    pub fn resolve(&self) -> Result<DateTime<Utc>, TaskDomainError> {
        let resolved = match self {
            Self::Millis(millis) => from_millis(*millis)
                .ok_or_else(|| TaskDomainError::InvalidDeadline(millis.to_string())),
            Self::Text(text) => {
                parse_text(text.trim()).ok_or_else(|| TaskDomainError::InvalidDeadline(text.clone()))
            }
        };
        resolved.map(truncate_to_millis)
    }
}

impl From<DateTime<Utc>> for DeadlineInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Text(value.to_rfc3339())
    }
}

impl From<i64> for DeadlineInput {
    fn from(millis: i64) -> Self {
        Self::Millis(millis)
    }
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    text.parse::<i64>().ok().and_then(from_millis)
}
