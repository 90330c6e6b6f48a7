//! User repository contract run against `PostgreSQL`.

use super::helpers::{setup_database, test_runtime};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::json;
use taskroster::query::{Filter, RecordQuery};
use taskroster::task::domain::TaskId;
use taskroster::user::{
    adapters::postgres::PostgresUserRepository,
    domain::{User, UserId, UserProfile},
    ports::{UserRepository, UserRepositoryError},
};

fn user(name: &str, email: &str, pending: &[TaskId]) -> User {
    let raw = pending.iter().map(ToString::to_string).collect();
    let profile = UserProfile::new(Some(name.to_owned()), Some(email.to_owned()), Some(raw))
        .expect("valid profile");
    User::new(profile, &DefaultClock)
}

#[rstest]
fn store_rejects_duplicate_email(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "user_dup");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    rt.block_on(repo.store(&user("Ada", "shared@example.com", &[])))
        .expect("first store succeeds");

    let result = rt.block_on(repo.store(&user("Grace", "shared@example.com", &[])));

    assert!(matches!(
        result,
        Err(UserRepositoryError::DuplicateEmail(email)) if email == "shared@example.com"
    ));
    assert_eq!(
        rt.block_on(repo.count(&Filter::All)).expect("count succeeds"),
        1
    );
}

#[rstest]
fn update_rejects_email_owned_by_another_user(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "user_update_email");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    let ada = user("Ada", "ada@example.com", &[]);
    let grace = user("Grace", "grace@example.com", &[]);
    rt.block_on(repo.store(&ada)).expect("store succeeds");
    rt.block_on(repo.store(&grace)).expect("store succeeds");

    let mut renamed = grace.clone();
    let profile = UserProfile::new(
        Some("Grace".to_owned()),
        Some("ada@example.com".to_owned()),
        None,
    )
    .expect("valid profile");
    renamed.replace_profile(profile);

    assert!(matches!(
        rt.block_on(repo.update(&renamed)),
        Err(UserRepositoryError::DuplicateEmail(_))
    ));
    rt.block_on(repo.update(&grace)).expect("self update succeeds");
}

#[rstest]
fn update_of_missing_user_is_not_found(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "user_update_missing");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    let ghost = user("Ghost", "ghost@example.com", &[]);

    assert!(matches!(
        rt.block_on(repo.update(&ghost)),
        Err(UserRepositoryError::NotFound(id)) if id == ghost.id()
    ));
}

#[rstest]
fn pending_task_updates_keep_order_and_ignore_missing_users(
    shared_test_cluster: &'static TestCluster,
) {
    let db = setup_database(shared_test_cluster, "user_pending");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    let first = TaskId::new();
    let second = TaskId::new();
    let ada = user("Ada", "ada@example.com", &[first]);
    rt.block_on(repo.store(&ada)).expect("store succeeds");

    rt.block_on(repo.add_pending_task(ada.id(), second))
        .expect("add succeeds");
    rt.block_on(repo.add_pending_task(ada.id(), second))
        .expect("repeat add succeeds");
    let stored = rt
        .block_on(repo.find_by_id(ada.id()))
        .expect("lookup succeeds")
        .expect("ada exists");
    assert_eq!(stored.pending_tasks(), [first, second]);

    rt.block_on(repo.remove_pending_task(ada.id(), first))
        .expect("remove succeeds");
    let trimmed = rt
        .block_on(repo.find_by_id(ada.id()))
        .expect("lookup succeeds")
        .expect("ada exists");
    assert_eq!(trimmed.pending_tasks(), [second]);

    rt.block_on(repo.add_pending_task(UserId::new(), TaskId::new()))
        .expect("no-op succeeds");
    rt.block_on(repo.remove_pending_task(UserId::new(), TaskId::new()))
        .expect("no-op succeeds");
}

#[rstest]
fn release_tasks_spares_the_kept_user(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "user_release");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    let shared = TaskId::new();
    let other = TaskId::new();
    let ada = user("Ada", "ada@example.com", &[shared, other]);
    let grace = user("Grace", "grace@example.com", &[shared]);
    rt.block_on(repo.store(&ada)).expect("store succeeds");
    rt.block_on(repo.store(&grace)).expect("store succeeds");

    let changed = rt
        .block_on(repo.release_tasks(&[shared], grace.id()))
        .expect("release succeeds");

    assert_eq!(changed, 1);
    let stored_ada = rt
        .block_on(repo.find_by_id(ada.id()))
        .expect("lookup succeeds")
        .expect("ada exists");
    let stored_grace = rt
        .block_on(repo.find_by_id(grace.id()))
        .expect("lookup succeeds")
        .expect("grace exists");
    assert_eq!(stored_ada.pending_tasks(), [other]);
    assert_eq!(stored_grace.pending_tasks(), [shared]);
}

#[rstest]
fn list_evaluates_queries_in_insertion_order(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "user_list");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    for (name, email) in [
        ("Cy", "cy@example.com"),
        ("Ann", "ann@example.com"),
        ("Bo", "bo@example.com"),
    ] {
        rt.block_on(repo.store(&user(name, email, &[])))
            .expect("store succeeds");
    }

    let natural = rt
        .block_on(repo.list(&RecordQuery::default()))
        .expect("list succeeds");
    let names: Vec<_> = natural.iter().filter_map(|doc| doc.get("name")).collect();
    assert_eq!(names, [&json!("Cy"), &json!("Ann"), &json!("Bo")]);

    let filtered = rt
        .block_on(repo.list(&RecordQuery::filtered(Filter::eq("name", "Bo"))))
        .expect("list succeeds");
    assert_eq!(filtered.len(), 1);
}

#[rstest]
fn delete_returns_the_removed_user(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "user_delete");
    let repo = PostgresUserRepository::new(db.pool());
    let rt = test_runtime();
    let ada = user("Ada", "ada@example.com", &[]);
    rt.block_on(repo.store(&ada)).expect("store succeeds");

    assert_eq!(
        rt.block_on(repo.delete(ada.id())).expect("delete succeeds"),
        Some(ada.clone())
    );
    assert_eq!(
        rt.block_on(repo.delete(ada.id())).expect("delete succeeds"),
        None
    );
}
