//! Repository port for user persistence and pending-task backlinks.

use crate::query::{Document, Filter, RecordQuery};
use crate::task::domain::TaskId;
use crate::user::domain::{User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the documents selected by the query.
    async fn list(&self, query: &RecordQuery) -> UserRepositoryResult<Vec<Document>>;

    /// Counts the users matching the filter.
    async fn count(&self, filter: &Filter) -> UserRepositoryResult<u64>;

    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateEmail`] when another user
    /// already has the email address.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Replaces an existing user with the given value.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not exist
    /// or [`UserRepositoryError::DuplicateEmail`] when another user already
    /// has the email address.
    async fn update(&self, user: &User) -> UserRepositoryResult<()>;

    /// Deletes a user, returning the removed record.
    ///
    /// Returns `None` when the user does not exist.
    async fn delete(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Adds a task to the user's pending list if absent.
    ///
    /// A missing user is not an error.
    async fn add_pending_task(&self, user_id: UserId, task_id: TaskId)
    -> UserRepositoryResult<()>;

    /// Removes a task from the user's pending list.
    ///
    /// A missing user is not an error.
    async fn remove_pending_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> UserRepositoryResult<()>;

    /// Removes the tasks from the pending list of every user except `keep`.
    ///
    /// Returns the number of users changed.
    async fn release_tasks(&self, task_ids: &[TaskId], keep: UserId)
    -> UserRepositoryResult<u64>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// Another user already has this email address.
    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
