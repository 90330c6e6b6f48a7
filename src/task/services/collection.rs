//! Service layer for the task collection and its assignment cascades.

use crate::error::{ClassifyError, ErrorClass};
use crate::query::{ListOutcome, ListParams, ListRequest, QueryError, QueryTranslator};
use crate::task::{
    domain::{Assignment, DeadlineInput, Task, TaskDetails, TaskDomainError, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::user::{
    domain::UserId,
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Request body for creating or fully replacing a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWriteRequest {
    name: Option<String>,
    description: Option<String>,
    deadline: Option<DeadlineInput>,
    completed: Option<bool>,
    assigned_user: Option<String>,
}

impl TaskWriteRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, deadline: impl Into<DeadlineInput>) -> Self {
        Self {
            name: Some(name.into()),
            deadline: Some(deadline.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Sets the raw assigned user identifier.
    #[must_use]
    pub fn with_assigned_user(mut self, user_id: impl Into<String>) -> Self {
        self.assigned_user = Some(user_id.into());
        self
    }

    fn details(&self) -> Result<TaskDetails, TaskDomainError> {
        TaskDetails::new(
            self.name.clone(),
            self.description.clone(),
            self.deadline.as_ref(),
            self.completed,
        )
    }

    fn assigned_user(&self) -> Option<&str> {
        self.assigned_user
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Service-level errors for task collection operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// List parameters could not be translated.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Request validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// `assignedUser` names a user that does not exist.
    #[error("assigned user does not exist: {0}")]
    UnknownAssignedUser(UserId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// User lookup failed.
    #[error(transparent)]
    UserRepository(#[from] UserRepositoryError),

    /// The task was written but updating a user's pending list failed.
    #[error("pending task update failed for task {task_id}: {source}")]
    Cascade {
        /// Task whose backlink could not be updated.
        task_id: TaskId,
        /// Underlying repository error.
        #[source]
        source: UserRepositoryError,
    },
}

impl ClassifyError for TaskServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Query(_) | Self::Domain(_) | Self::UnknownAssignedUser(_) => {
                ErrorClass::BadRequest
            }
            Self::NotFound(_) | Self::Repository(TaskRepositoryError::NotFound(_)) => {
                ErrorClass::NotFound
            }
            Self::Repository(_) | Self::UserRepository(_) | Self::Cascade { .. } => {
                ErrorClass::ServerError
            }
        }
    }

    fn public_message(&self) -> Option<&'static str> {
        match self {
            Self::Query(_) => Some("Invalid query parameters"),
            Self::Domain(TaskDomainError::MissingName | TaskDomainError::MissingDeadline) => {
                Some("Name and deadline are required")
            }
            Self::Domain(TaskDomainError::InvalidDeadline(_)) => Some("Invalid deadline"),
            Self::Domain(TaskDomainError::InvalidTaskId(_)) => Some("Invalid task ID"),
            Self::Domain(TaskDomainError::InvalidAssignedUser(_)) | Self::UnknownAssignedUser(_) => {
                Some("Invalid assigned user")
            }
            Self::NotFound(_) | Self::Repository(TaskRepositoryError::NotFound(_)) => {
                Some("Task not found")
            }
            Self::Repository(_) | Self::UserRepository(_) | Self::Cascade { .. } => None,
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task collection service.
///
/// Owns the rule that a task's assigned user lists the task in
/// `pendingTasks`. Cascades run as separate repository calls after the task
/// write; a failing cascade is reported but earlier writes stay committed.
pub struct TaskService<T, U, C>
where
    T: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    users: Arc<U>,
    clock: Arc<C>,
    translator: QueryTranslator,
}

impl<T, U, C> Clone for TaskService<T, U, C>
where
    T: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            translator: self.translator,
        }
    }
}

impl<T, U, C> TaskService<T, U, C>
where
    T: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a task service over the given repositories.
    #[must_use]
    pub const fn new(tasks: Arc<T>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            users,
            clock,
            translator: QueryTranslator::for_tasks(),
        }
    }

    /// Lists tasks or counts them, depending on the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Query`] when a parameter cannot be parsed,
    /// or a repository error.
    pub async fn list(&self, params: &ListParams) -> TaskServiceResult<ListOutcome> {
        match self.translator.translate(params)? {
            ListRequest::Count(filter) => Ok(ListOutcome::Count(self.tasks.count(&filter).await?)),
            ListRequest::Fetch(query) => Ok(ListOutcome::Records(self.tasks.list(&query).await?)),
        }
    }

    /// Fetches one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn get(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Creates a task and, when assigned, records it on the user.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskServiceError::Domain`] or
    /// [`TaskServiceError::UnknownAssignedUser`] before anything is written,
    /// and [`TaskServiceError::Cascade`] when the task was stored but the
    /// user's pending list could not be updated.
    pub async fn create(&self, request: TaskWriteRequest) -> TaskServiceResult<Task> {
        let details = request.details()?;
        let assignment = self.resolve_assignment(request.assigned_user()).await?;
        let task = Task::new(details, assignment, &*self.clock);

        self.tasks.store(&task).await?;
        if let Some(user_id) = task.assignment().user_id() {
            self.add_backlink(user_id, task.id()).await?;
        }

        info!(task_id = %task.id(), assigned_user = %task.assignment().user_field(), "task created");
        Ok(task)
    }

    /// Replaces every writable field of a task and moves its backlink.
    ///
    /// The previous assignee always loses the backlink and the new assignee
    /// always gains it, even when both are the same user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist,
    /// validation errors before anything is written, and
    /// [`TaskServiceError::Cascade`] when a backlink update fails.
    pub async fn replace(&self, id: TaskId, request: TaskWriteRequest) -> TaskServiceResult<Task> {
        let details = request.details()?;
        let mut task = self.get(id).await?;
        let assignment = self.resolve_assignment(request.assigned_user()).await?;

        if let Some(previous) = task.assignment().user_id() {
            self.remove_backlink(previous, id).await?;
        }
        task.replace(details, assignment);
        self.tasks.update(&task).await?;
        if let Some(user_id) = task.assignment().user_id() {
            self.add_backlink(user_id, id).await?;
        }

        info!(task_id = %id, assigned_user = %task.assignment().user_field(), "task replaced");
        Ok(task)
    }

    /// Deletes a task and removes it from its assignee's pending list.
    ///
    /// Returns the deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist and
    /// [`TaskServiceError::Cascade`] when the backlink removal fails.
    pub async fn delete(&self, id: TaskId) -> TaskServiceResult<Task> {
        let task = self.get(id).await?;
        if let Some(user_id) = task.assignment().user_id() {
            self.remove_backlink(user_id, id).await?;
        }
        let deleted = self
            .tasks
            .delete(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;

        info!(task_id = %id, "task deleted");
        Ok(deleted)
    }

    async fn resolve_assignment(&self, raw: Option<&str>) -> TaskServiceResult<Assignment> {
        let Some(raw_id) = raw else {
            return Ok(Assignment::Unassigned);
        };
        let user_id = raw_id
            .parse::<UserId>()
            .map_err(|_| TaskDomainError::InvalidAssignedUser(raw_id.to_owned()))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(TaskServiceError::UnknownAssignedUser(user_id))?;
        Ok(Assignment::to_user(&user))
    }

    async fn add_backlink(&self, user_id: UserId, task_id: TaskId) -> TaskServiceResult<()> {
        self.users
            .add_pending_task(user_id, task_id)
            .await
            .map_err(|source| cascade_failed(task_id, user_id, source))
    }

    async fn remove_backlink(&self, user_id: UserId, task_id: TaskId) -> TaskServiceResult<()> {
        self.users
            .remove_pending_task(user_id, task_id)
            .await
            .map_err(|source| cascade_failed(task_id, user_id, source))
    }
}

fn cascade_failed(task_id: TaskId, user_id: UserId, source: UserRepositoryError) -> TaskServiceError {
    error!(%task_id, %user_id, error = %source, "pending task update failed");
    TaskServiceError::Cascade { task_id, source }
}
