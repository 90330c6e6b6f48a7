//! Uniform `{message, data}` response body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Response body shared by every endpoint; `data` is `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload, if any.
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Creates an envelope carrying a payload.
    #[must_use]
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Creates an envelope with `data: null`.
    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Renders an envelope with the given status.
#[must_use]
pub fn respond<T: Serialize>(status: StatusCode, envelope: Envelope<T>) -> Response {
    (status, Json(envelope)).into_response()
}
