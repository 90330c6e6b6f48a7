//! Service layer for the user collection and its task cascades.

use crate::error::{ClassifyError, ErrorClass};
use crate::query::{ListOutcome, ListParams, ListRequest, QueryError, QueryTranslator};
use crate::task::ports::{TaskRepository, TaskRepositoryError};
use crate::user::{
    domain::{User, UserDomainError, UserId, UserProfile},
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Request body for creating or fully replacing a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWriteRequest {
    name: Option<String>,
    email: Option<String>,
    pending_tasks: Option<Vec<String>>,
}

impl UserWriteRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            pending_tasks: None,
        }
    }

    /// Sets the pending task identifiers.
    #[must_use]
    pub fn with_pending_tasks<I, S>(mut self, task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending_tasks = Some(task_ids.into_iter().map(Into::into).collect());
        self
    }

    fn profile(&self) -> Result<UserProfile, UserDomainError> {
        UserProfile::new(
            self.name.clone(),
            self.email.clone(),
            self.pending_tasks.clone(),
        )
    }
}

/// Cascade step that failed after the user record was written.
#[derive(Debug, Error)]
pub enum UserCascadeError {
    /// Bulk task update failed.
    #[error(transparent)]
    Tasks(TaskRepositoryError),
    /// Releasing task ids from other users failed.
    #[error(transparent)]
    Users(UserRepositoryError),
}

/// Service-level errors for user collection operations.
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// List parameters could not be translated.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Request validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),

    /// The user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// User repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),

    /// The user was written but re-pointing its tasks failed.
    #[error("task cascade failed for user {user_id}: {source}")]
    Cascade {
        /// User whose tasks could not be updated.
        user_id: UserId,
        /// Failed step.
        #[source]
        source: UserCascadeError,
    },
}

impl ClassifyError for UserServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Query(_) | Self::Domain(_) => ErrorClass::BadRequest,
            Self::NotFound(_) | Self::Repository(UserRepositoryError::NotFound(_)) => {
                ErrorClass::NotFound
            }
            Self::Repository(UserRepositoryError::DuplicateEmail(_)) => ErrorClass::Conflict,
            Self::Repository(_) | Self::Cascade { .. } => ErrorClass::ServerError,
        }
    }

    fn public_message(&self) -> Option<&'static str> {
        match self {
            Self::Query(_) => Some("Invalid query parameters"),
            Self::Domain(UserDomainError::MissingName | UserDomainError::MissingEmail) => {
                Some("Name and email are required")
            }
            Self::Domain(UserDomainError::InvalidUserId(_)) => Some("Invalid user ID"),
            Self::Domain(UserDomainError::InvalidTaskReference(_)) => {
                Some("Invalid task ID in pendingTasks")
            }
            Self::NotFound(_) | Self::Repository(UserRepositoryError::NotFound(_)) => {
                Some("User not found")
            }
            Self::Repository(UserRepositoryError::DuplicateEmail(_)) => {
                Some("Email already exists")
            }
            Self::Repository(_) | Self::Cascade { .. } => None,
        }
    }
}

/// Result type for user service operations.
pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// User collection service.
///
/// Every create or replace recomputes the user's task assignments from its
/// `pendingTasks` list; deletion unassigns all of the user's tasks.
pub struct UserService<U, T, C>
where
    U: UserRepository + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    tasks: Arc<T>,
    clock: Arc<C>,
    translator: QueryTranslator,
}

impl<U, T, C> Clone for UserService<U, T, C>
where
    U: UserRepository + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
            translator: self.translator,
        }
    }
}

impl<U, T, C> UserService<U, T, C>
where
    U: UserRepository + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a user service over the given repositories.
    #[must_use]
    pub const fn new(users: Arc<U>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            users,
            tasks,
            clock,
            translator: QueryTranslator::for_users(),
        }
    }

    /// Lists users or counts them, depending on the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Query`] when a parameter cannot be parsed,
    /// or a repository error.
    pub async fn list(&self, params: &ListParams) -> UserServiceResult<ListOutcome> {
        match self.translator.translate(params)? {
            ListRequest::Count(filter) => Ok(ListOutcome::Count(self.users.count(&filter).await?)),
            ListRequest::Fetch(query) => Ok(ListOutcome::Records(self.users.list(&query).await?)),
        }
    }

    /// Fetches one user.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::NotFound`] when the user does not exist.
    pub async fn get(&self, id: UserId) -> UserServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound(id))
    }

    /// Creates a user and assigns the tasks listed in `pendingTasks` to it.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Domain`] for invalid input, a
    /// `DuplicateEmail` repository error when the email is taken, and
    /// [`UserServiceError::Cascade`] when the user was stored but its tasks
    /// could not be re-pointed.
    pub async fn create(&self, request: UserWriteRequest) -> UserServiceResult<User> {
        let profile = request.profile()?;
        let user = User::new(profile, &*self.clock);

        self.users.store(&user).await?;
        self.claim_pending_tasks(&user).await?;

        info!(user_id = %user.id(), pending = user.pending_tasks().len(), "user created");
        Ok(user)
    }

    /// Replaces a user's writable fields and recomputes its assignments.
    ///
    /// The user record is written first, so `NotFound` and email conflicts
    /// abort before any task changes. Then every task pointing at the user is
    /// unassigned and the tasks in the new `pendingTasks` are assigned back.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::NotFound`] when the user does not exist,
    /// validation or conflict errors, and [`UserServiceError::Cascade`] when a
    /// task update fails.
    pub async fn replace(&self, id: UserId, request: UserWriteRequest) -> UserServiceResult<User> {
        let profile = request.profile()?;
        let mut user = self.get(id).await?;
        user.replace_profile(profile);

        self.users.update(&user).await?;
        self.unassign_tasks(id).await?;
        self.claim_pending_tasks(&user).await?;

        info!(user_id = %id, pending = user.pending_tasks().len(), "user replaced");
        Ok(user)
    }

    /// Deletes a user and unassigns every task pointing at it.
    ///
    /// Returns the deleted user.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::NotFound`] when the user does not exist and
    /// [`UserServiceError::Cascade`] when the bulk unassignment fails.
    pub async fn delete(&self, id: UserId) -> UserServiceResult<User> {
        let deleted = self
            .users
            .delete(id)
            .await?
            .ok_or(UserServiceError::NotFound(id))?;
        let unassigned = self.unassign_tasks(id).await?;

        info!(user_id = %id, unassigned, "user deleted");
        Ok(deleted)
    }

    async fn unassign_tasks(&self, user_id: UserId) -> UserServiceResult<u64> {
        self.tasks
            .unassign_all_for_user(user_id)
            .await
            .map_err(|source| cascade_failed(user_id, UserCascadeError::Tasks(source)))
    }

    async fn claim_pending_tasks(&self, user: &User) -> UserServiceResult<()> {
        let task_ids = user.pending_tasks();
        if task_ids.is_empty() {
            return Ok(());
        }

        self.users
            .release_tasks(task_ids, user.id())
            .await
            .map_err(|source| cascade_failed(user.id(), UserCascadeError::Users(source)))?;
        self.tasks
            .assign_many(task_ids, user.id(), user.name())
            .await
            .map_err(|source| cascade_failed(user.id(), UserCascadeError::Tasks(source)))?;
        Ok(())
    }
}

fn cascade_failed(user_id: UserId, source: UserCascadeError) -> UserServiceError {
    error!(%user_id, error = %source, "task cascade failed");
    UserServiceError::Cascade { user_id, source }
}
