//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is missing or empty.
    #[error("task name is required")]
    MissingName,

    /// The deadline is missing.
    #[error("task deadline is required")]
    MissingDeadline,

    /// The deadline could not be interpreted as a timestamp.
    #[error("invalid deadline '{0}'")]
    InvalidDeadline(String),

    /// The identifier is not a valid task id.
    #[error("invalid task id: {0}")]
    InvalidTaskId(String),

    /// A persisted assignment references a malformed user id.
    #[error("invalid assigned user reference: {0}")]
    InvalidAssignedUser(String),
}
