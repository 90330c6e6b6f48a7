//! Backlink failures after a task write surface as server errors and leave
//! the task write committed.

use std::sync::Arc;

use crate::error::{ClassifyError, ErrorClass};
use crate::query::{Document, Filter, RecordQuery};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{DeadlineInput, TaskId},
    ports::TaskRepository,
    services::{TaskService, TaskServiceError, TaskWriteRequest},
};
use crate::user::{
    domain::{User, UserId, UserProfile},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use mockable::DefaultClock;
use mockall::mock;
use rstest::rstest;

mock! {
    Users {}

    #[async_trait]
    impl UserRepository for Users {
        async fn list(&self, query: &RecordQuery) -> UserRepositoryResult<Vec<Document>>;
        async fn count(&self, filter: &Filter) -> UserRepositoryResult<u64>;
        async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;
        async fn store(&self, user: &User) -> UserRepositoryResult<()>;
        async fn update(&self, user: &User) -> UserRepositoryResult<()>;
        async fn delete(&self, id: UserId) -> UserRepositoryResult<Option<User>>;
        async fn add_pending_task(&self, user_id: UserId, task_id: TaskId) -> UserRepositoryResult<()>;
        async fn remove_pending_task(&self, user_id: UserId, task_id: TaskId) -> UserRepositoryResult<()>;
        async fn release_tasks(&self, task_ids: &[TaskId], keep: UserId) -> UserRepositoryResult<u64>;
    }
}

fn store_down() -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other("connection reset"))
}

fn assignee() -> User {
    let profile = UserProfile::new(Some("Ada".to_owned()), Some("ada@example.com".to_owned()), None)
        .expect("valid profile");
    User::new(profile, &DefaultClock)
}

fn deadline() -> DeadlineInput {
    DeadlineInput::Text("2031-01-01".to_owned())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_backlink_on_create_keeps_the_stored_task() {
    let user = assignee();
    let user_id = user.id();
    let mut users = MockUsers::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
    users
        .expect_add_pending_task()
        .times(1)
        .returning(|_, _| Err(store_down()));

    let tasks = Arc::new(InMemoryTaskRepository::new());
    let service = TaskService::new(Arc::clone(&tasks), Arc::new(users), Arc::new(DefaultClock));

    let result = service
        .create(TaskWriteRequest::new("Partial", deadline()).with_assigned_user(user_id.to_string()))
        .await;

    let Err(err) = result else {
        panic!("expected cascade failure");
    };
    assert!(matches!(err, TaskServiceError::Cascade { .. }));
    assert_eq!(err.class(), ErrorClass::ServerError);
    assert_eq!(err.public_message(), None);
    assert_eq!(tasks.count(&Filter::All).await.expect("count succeeds"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_backlink_removal_on_delete_keeps_the_task() {
    let user = assignee();
    let user_id = user.id();
    let mut users = MockUsers::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
    users.expect_add_pending_task().returning(|_, _| Ok(()));
    users
        .expect_remove_pending_task()
        .times(1)
        .returning(|_, _| Err(store_down()));

    let tasks = Arc::new(InMemoryTaskRepository::new());
    let service = TaskService::new(Arc::clone(&tasks), Arc::new(users), Arc::new(DefaultClock));
    let task = service
        .create(TaskWriteRequest::new("Sticky", deadline()).with_assigned_user(user_id.to_string()))
        .await
        .expect("task created");

    let result = service.delete(task.id()).await;

    assert!(matches!(result, Err(TaskServiceError::Cascade { task_id, .. }) if task_id == task.id()));
    assert!(tasks.find_by_id(task.id()).await.expect("lookup succeeds").is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_user_lookup_is_a_server_error_and_writes_nothing() {
    let mut users = MockUsers::new();
    users.expect_find_by_id().returning(|_| Err(store_down()));
    users.expect_add_pending_task().never();

    let tasks = Arc::new(InMemoryTaskRepository::new());
    let service = TaskService::new(Arc::clone(&tasks), Arc::new(users), Arc::new(DefaultClock));

    let result = service
        .create(TaskWriteRequest::new("Blocked", deadline()).with_assigned_user(UserId::new().to_string()))
        .await;

    let Err(err) = result else {
        panic!("expected failure");
    };
    assert_eq!(err.class(), ErrorClass::ServerError);
    assert_eq!(tasks.count(&Filter::All).await.expect("count succeeds"), 0);
}
