//! Error classification shared by the collection services.
//!
//! Services keep rich `thiserror` enums internally; at the HTTP boundary every
//! failure collapses into one of four classes with a fixed public message.

use std::fmt;

/// Client-visible failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed input, unparseable query, missing field or invalid reference.
    BadRequest,
    /// The identifier does not resolve to a record.
    NotFound,
    /// A uniqueness constraint was violated.
    Conflict,
    /// Unexpected store or cascade failure.
    ServerError,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ServerError => "server_error",
        };
        f.write_str(label)
    }
}

/// Maps a service error onto an [`ErrorClass`] and a fixed message.
pub trait ClassifyError: std::error::Error {
    /// Returns the failure class.
    fn class(&self) -> ErrorClass;

    /// Returns the fixed client-facing message, or `None` to use the
    /// operation's generic message.
    fn public_message(&self) -> Option<&'static str>;
}
