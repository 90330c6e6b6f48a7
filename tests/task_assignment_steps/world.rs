//! Shared world state for task assignment BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskroster::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskService, TaskServiceError},
};
use taskroster::user::{
    adapters::memory::InMemoryUserRepository,
    domain::User,
    services::UserService,
};

/// Task service over the shared in-memory repositories.
pub type WorldTaskService =
    TaskService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// User service over the shared in-memory repositories.
pub type WorldUserService =
    UserService<InMemoryUserRepository, InMemoryTaskRepository, DefaultClock>;

/// Scenario world for assignment behaviour tests.
pub struct AssignmentWorld {
    pub tasks: WorldTaskService,
    pub users: WorldUserService,
    pub known_users: HashMap<String, User>,
    pub current_task: Option<Task>,
    pub last_task_error: Option<TaskServiceError>,
}

impl AssignmentWorld {
    /// Creates a world whose services share one pair of repositories.
    #[must_use]
    pub fn new() -> Self {
        let task_repo = Arc::new(InMemoryTaskRepository::new());
        let user_repo = Arc::new(InMemoryUserRepository::new());
        let clock = Arc::new(DefaultClock);

        Self {
            tasks: TaskService::new(
                Arc::clone(&task_repo),
                Arc::clone(&user_repo),
                Arc::clone(&clock),
            ),
            users: UserService::new(user_repo, task_repo, clock),
            known_users: HashMap::new(),
            current_task: None,
            last_task_error: None,
        }
    }

    /// Looks up a user created earlier in the scenario by name.
    pub fn user(&self, name: &str) -> Result<&User, eyre::Report> {
        self.known_users
            .get(name)
            .ok_or_else(|| eyre::eyre!("user {name} was not created in this scenario"))
    }

    /// Returns the task the scenario is working on.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.current_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))
    }
}

impl Default for AssignmentWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AssignmentWorld {
    AssignmentWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Deadline used for every scenario task.
pub const DEADLINE_MILLIS: i64 = 1_900_000_000_000;
