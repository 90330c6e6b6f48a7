//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing domain user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user name is missing or empty.
    #[error("user name is required")]
    MissingName,

    /// The email address is missing or empty.
    #[error("user email is required")]
    MissingEmail,

    /// The identifier is not a valid user id.
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    /// A `pendingTasks` entry is not a valid task id.
    #[error("invalid task reference in pendingTasks: {0}")]
    InvalidTaskReference(String),
}
