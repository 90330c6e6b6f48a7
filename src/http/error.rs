//! Conversion of service failures into enveloped HTTP responses.

use super::envelope::{Envelope, respond};
use crate::error::{ClassifyError, ErrorClass};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

/// Error response carrying a status and a fixed client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Message placed in the envelope.
    pub message: String,
}

impl ApiErrorResponse {
    /// Creates a new error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Converts a classified service failure.
    ///
    /// Server errors are logged with their full cause chain and answered with
    /// `fallback`; other classes use the error's fixed public message.
    #[must_use]
    pub fn from_failure<E: ClassifyError>(failure: &E, fallback: &'static str) -> Self {
        let class = failure.class();
        if class == ErrorClass::ServerError {
            error!(error = %failure, cause = ?std::error::Error::source(failure), "request failed");
        } else {
            debug!(%class, error = %failure, "request rejected");
        }
        Self::new(
            status_for(class),
            failure.public_message().unwrap_or(fallback),
        )
    }
}

/// Maps a failure class onto its HTTP status.
///
/// Conflicts answer `400`, matching the documented duplicate-email behaviour.
#[must_use]
pub const fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::BadRequest | ErrorClass::Conflict => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        respond(self.status, Envelope::empty(self.message))
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "malformed request body");
        Self::bad_request("Invalid JSON body")
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        debug!(error = %rejection, "malformed query string");
        Self::bad_request("Invalid query parameters")
    }
}
