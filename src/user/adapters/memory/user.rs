//! In-memory user repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::query::{Document, Filter, RecordQuery};
use crate::task::domain::TaskId;
use crate::user::{
    domain::{User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository enforcing unique email addresses.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, User>,
    order: Vec<UserId>,
}

impl InMemoryUserState {
    fn ordered(&self) -> impl Iterator<Item = &User> {
        self.order.iter().filter_map(|id| self.users.get(id))
    }

    fn email_taken(&self, email: &str, except: UserId) -> bool {
        self.users
            .values()
            .any(|user| user.id() != except && user.email() == email)
    }
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UserRepositoryResult<RwLockReadGuard<'_, InMemoryUserState>> {
        self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> UserRepositoryResult<RwLockWriteGuard<'_, InMemoryUserState>> {
        self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn to_document(user: &User) -> UserRepositoryResult<Document> {
    match serde_json::to_value(user).map_err(UserRepositoryError::persistence)? {
        serde_json::Value::Object(document) => Ok(document),
        _ => Err(UserRepositoryError::persistence(std::io::Error::other(
            "user did not serialise to an object",
        ))),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, query: &RecordQuery) -> UserRepositoryResult<Vec<Document>> {
        let state = self.read()?;
        let documents = state
            .ordered()
            .map(to_document)
            .collect::<UserRepositoryResult<Vec<_>>>()?;
        Ok(query.apply(documents))
    }

    async fn count(&self, filter: &Filter) -> UserRepositoryResult<u64> {
        let state = self.read()?;
        let mut matching: u64 = 0;
        for user in state.ordered() {
            if filter.matches(&to_document(user)?) {
                matching += 1;
            }
        }
        Ok(matching)
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).cloned())
    }

    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id()) {
            return Err(UserRepositoryError::DuplicateUser(user.id()));
        }
        if state.email_taken(user.email(), user.id()) {
            return Err(UserRepositoryError::DuplicateEmail(user.email().to_owned()));
        }
        state.order.push(user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user.id()) {
            return Err(UserRepositoryError::NotFound(user.id()));
        }
        if state.email_taken(user.email(), user.id()) {
            return Err(UserRepositoryError::DuplicateEmail(user.email().to_owned()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let mut state = self.write()?;
        let removed = state.users.remove(&id);
        if removed.is_some() {
            state.order.retain(|existing| *existing != id);
        }
        Ok(removed)
    }

    async fn add_pending_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.add_pending_task(task_id);
        }
        Ok(())
    }

    async fn remove_pending_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.remove_pending_task(task_id);
        }
        Ok(())
    }

    async fn release_tasks(&self, task_ids: &[TaskId], keep: UserId) -> UserRepositoryResult<u64> {
        let mut state = self.write()?;
        let mut changed: u64 = 0;
        for user in state.users.values_mut().filter(|user| user.id() != keep) {
            let mut touched = false;
            for task_id in task_ids {
                touched |= user.remove_pending_task(*task_id);
            }
            if touched {
                changed += 1;
            }
        }
        Ok(changed)
    }
}
