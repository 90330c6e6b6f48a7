//! Repository port for task persistence, listing and bulk assignment updates.

use crate::query::{Document, Filter, RecordQuery};
use crate::task::domain::{Task, TaskId};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each method is an independent single-call store operation; callers that
/// chain several calls get no atomicity across them.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns the documents selected by the query.
    async fn list(&self, query: &RecordQuery) -> TaskRepositoryResult<Vec<Document>>;

    /// Counts the tasks matching the filter.
    async fn count(&self, filter: &Filter) -> TaskRepositoryResult<u64>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier is
    /// already taken.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Replaces an existing task with the given value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Deletes a task, returning the removed record.
    ///
    /// Returns `None` when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Marks every task assigned to `user_id` as unassigned.
    ///
    /// Returns the number of tasks changed.
    async fn unassign_all_for_user(&self, user_id: UserId) -> TaskRepositoryResult<u64>;

    /// Assigns every listed task that exists to the user, overwriting the
    /// name snapshot.
    ///
    /// Returns the number of tasks changed; unknown identifiers are skipped.
    async fn assign_many(
        &self,
        task_ids: &[TaskId],
        user_id: UserId,
        user_name: &str,
    ) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
