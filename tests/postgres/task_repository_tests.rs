//! Task repository contract run against `PostgreSQL`.

use super::helpers::{setup_database, test_runtime};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::{Value, json};
use taskroster::query::{Filter, RecordQuery};
use taskroster::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{Assignment, DeadlineInput, Task, TaskDetails, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use taskroster::user::domain::UserId;

fn task(name: &str, assignment: Assignment) -> Task {
    let deadline = DeadlineInput::Millis(1_900_000_000_000);
    let details = TaskDetails::new(Some(name.to_owned()), None, Some(&deadline), None)
        .expect("valid details");
    Task::new(details, assignment, &DefaultClock)
}

fn assigned_to(user_id: UserId, user_name: &str) -> Assignment {
    Assignment::Assigned {
        user_id,
        user_name: user_name.to_owned(),
    }
}

#[rstest]
fn store_rejects_duplicate_ids(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "task_dup");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let docs = task("Docs", Assignment::Unassigned);

    rt.block_on(repo.store(&docs)).expect("first store succeeds");
    let result = rt.block_on(repo.store(&docs));

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == docs.id()));
}

#[rstest]
fn stored_task_round_trips(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "task_find");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let docs = task("Docs", assigned_to(UserId::new(), "Ada"));

    rt.block_on(repo.store(&docs)).expect("store succeeds");
    let found = rt
        .block_on(repo.find_by_id(docs.id()))
        .expect("lookup succeeds");

    assert_eq!(found, Some(docs));
    assert_eq!(
        rt.block_on(repo.find_by_id(TaskId::new()))
            .expect("lookup succeeds"),
        None
    );
}

#[rstest]
fn update_of_missing_task_is_not_found(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "task_update");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let ghost = task("Ghost", Assignment::Unassigned);

    let result = rt.block_on(repo.update(&ghost));

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == ghost.id()));
}

#[rstest]
fn list_keeps_insertion_order_after_deletes(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "task_order");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let first = task("first", Assignment::Unassigned);
    let second = task("second", Assignment::Unassigned);
    let third = task("third", Assignment::Unassigned);
    for entry in [&first, &second, &third] {
        rt.block_on(repo.store(entry)).expect("store succeeds");
    }

    let removed = rt
        .block_on(repo.delete(second.id()))
        .expect("delete succeeds");
    let names: Vec<Value> = rt
        .block_on(repo.list(&RecordQuery::default()))
        .expect("list succeeds")
        .into_iter()
        .filter_map(|document| document.get("name").cloned())
        .collect();

    assert_eq!(removed, Some(second.clone()));
    assert_eq!(names, [json!("first"), json!("third")]);
    assert_eq!(
        rt.block_on(repo.delete(second.id())).expect("delete succeeds"),
        None
    );
}

#[rstest]
fn unassign_all_touches_only_the_given_user(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "task_unassign");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let ada = UserId::new();
    let grace = UserId::new();
    let mine = task("mine", assigned_to(ada, "Ada"));
    let theirs = task("theirs", assigned_to(grace, "Grace"));
    rt.block_on(repo.store(&mine)).expect("store succeeds");
    rt.block_on(repo.store(&theirs)).expect("store succeeds");

    let changed = rt
        .block_on(repo.unassign_all_for_user(ada))
        .expect("unassign succeeds");

    assert_eq!(changed, 1);
    let reloaded = rt
        .block_on(repo.find_by_id(mine.id()))
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(reloaded.assignment(), &Assignment::Unassigned);
    assert_eq!(reloaded.assignment().user_name(), "unassigned");
    let untouched = rt
        .block_on(repo.find_by_id(theirs.id()))
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(untouched.assignment(), &assigned_to(grace, "Grace"));
}

#[rstest]
fn assign_many_skips_unknown_ids(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "task_assign");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let docs = task("Docs", assigned_to(UserId::new(), "Old owner"));
    rt.block_on(repo.store(&docs)).expect("store succeeds");
    let ada = UserId::new();

    let changed = rt
        .block_on(repo.assign_many(&[docs.id(), TaskId::new()], ada, "Ada"))
        .expect("assign succeeds");

    assert_eq!(changed, 1);
    let count = rt
        .block_on(repo.count(&Filter::eq("assignedUser", ada.to_string())))
        .expect("count succeeds");
    assert_eq!(count, 1);
    let reloaded = rt
        .block_on(repo.find_by_id(docs.id()))
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(reloaded.assignment(), &assigned_to(ada, "Ada"));
}
