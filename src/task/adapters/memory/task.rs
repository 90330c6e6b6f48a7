//! In-memory task repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::query::{Document, Filter, RecordQuery};
use crate::task::{
    domain::{Assignment, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;

/// Thread-safe in-memory task repository.
///
/// Records are listed in insertion order unless a query sorts them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
}

impl InMemoryTaskState {
    fn ordered(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Renders a task as the document that queries are evaluated against.
fn to_document(task: &Task) -> TaskRepositoryResult<Document> {
    match serde_json::to_value(task).map_err(TaskRepositoryError::persistence)? {
        serde_json::Value::Object(document) => Ok(document),
        _ => Err(TaskRepositoryError::persistence(std::io::Error::other(
            "task did not serialise to an object",
        ))),
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self, query: &RecordQuery) -> TaskRepositoryResult<Vec<Document>> {
        let state = self.read()?;
        let documents = state
            .ordered()
            .map(to_document)
            .collect::<TaskRepositoryResult<Vec<_>>>()?;
        Ok(query.apply(documents))
    }

    async fn count(&self, filter: &Filter) -> TaskRepositoryResult<u64> {
        let state = self.read()?;
        let mut matching: u64 = 0;
        for task in state.ordered() {
            if filter.matches(&to_document(task)?) {
                matching += 1;
            }
        }
        Ok(matching)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.order.push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let mut state = self.write()?;
        let removed = state.tasks.remove(&id);
        if removed.is_some() {
            state.order.retain(|existing| *existing != id);
        }
        Ok(removed)
    }

    async fn unassign_all_for_user(&self, user_id: UserId) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let mut changed: u64 = 0;
        for task in state.tasks.values_mut() {
            if task.assignment().user_id() == Some(user_id) {
                task.set_assignment(Assignment::Unassigned);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn assign_many(
        &self,
        task_ids: &[TaskId],
        user_id: UserId,
        user_name: &str,
    ) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let mut changed: u64 = 0;
        for task_id in task_ids {
            if let Some(task) = state.tasks.get_mut(task_id) {
                task.set_assignment(Assignment::Assigned {
                    user_id,
                    user_name: user_name.to_owned(),
                });
                changed += 1;
            }
        }
        Ok(changed)
    }
}
