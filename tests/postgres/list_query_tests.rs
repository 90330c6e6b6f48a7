//! SQL-compiled list queries agree with in-memory evaluation.

use super::helpers::{setup_database, test_runtime};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::{Value, json};
use taskroster::query::{Document, Filter, ListParams, ListRequest, QueryTranslator, RecordQuery};
use taskroster::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{Assignment, DeadlineInput, Task, TaskDetails},
    ports::TaskRepository,
};

fn fetch_query(params: &ListParams) -> RecordQuery {
    let ListRequest::Fetch(query) = QueryTranslator::new(None)
        .translate(params)
        .expect("valid parameters")
    else {
        panic!("expected a fetch request");
    };
    query
}

fn labels(documents: &[Document]) -> Vec<Value> {
    documents
        .iter()
        .map(|document| document.get("label").cloned().unwrap_or(Value::Null))
        .collect()
}

fn names(documents: &[Document]) -> Vec<&str> {
    documents
        .iter()
        .filter_map(|document| document.get("name").and_then(Value::as_str))
        .collect()
}

fn as_document(value: Value) -> Document {
    let Value::Object(document) = value else {
        panic!("fixture is an object");
    };
    document
}

fn task_due(name: &str, millis: i64) -> Task {
    let deadline = DeadlineInput::Millis(millis);
    let details = TaskDetails::new(Some(name.to_owned()), None, Some(&deadline), None)
        .expect("valid details");
    Task::new(details, Assignment::Unassigned, &DefaultClock)
}

#[rstest]
#[case(r#"{"rank":1}"#)]
#[case(r#"{"rank":-1}"#)]
fn mixed_type_sort_matches_in_memory_order(
    shared_test_cluster: &'static TestCluster,
    #[case] sort: &str,
) {
    let db = setup_database(shared_test_cluster, "list_mixed_sort");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    let fixtures = [
        json!({ "label": "bool", "rank": true }),
        json!({ "label": "ten", "rank": 10 }),
        json!({ "label": "lower", "rank": "b" }),
        json!({ "label": "missing" }),
        json!({ "label": "array", "rank": [1] }),
        json!({ "label": "two", "rank": 2 }),
        json!({ "label": "null", "rank": null }),
        json!({ "label": "object", "rank": { "a": 1 } }),
        json!({ "label": "upper", "rank": "B" }),
    ];
    for fixture in &fixtures {
        db.insert_task_document(fixture);
    }
    let query = fetch_query(&ListParams::default().with_sort(sort));

    let from_sql = rt.block_on(repo.list(&query)).expect("list succeeds");
    let in_memory = query.apply(fixtures.into_iter().map(as_document));

    assert_eq!(labels(&from_sql), labels(&in_memory));
}

#[rstest]
fn descending_sort_puts_booleans_first_and_missing_last(
    shared_test_cluster: &'static TestCluster,
) {
    let db = setup_database(shared_test_cluster, "list_desc");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    for fixture in [
        json!({ "label": "missing" }),
        json!({ "label": "number", "rank": 1 }),
        json!({ "label": "bool", "rank": false }),
    ] {
        db.insert_task_document(&fixture);
    }
    let query = fetch_query(&ListParams::default().with_sort(r#"{"rank":-1}"#));

    let listed = rt.block_on(repo.list(&query)).expect("list succeeds");

    assert_eq!(
        labels(&listed),
        [json!("bool"), json!("number"), json!("missing")]
    );
}

#[rstest]
#[case(r#"{"deadline":1}"#, ["earlier", "later"])]
#[case(r#"{"deadline":-1}"#, ["later", "earlier"])]
fn deadlines_within_one_second_sort_chronologically(
    shared_test_cluster: &'static TestCluster,
    #[case] sort: &str,
    #[case] expected: [&str; 2],
) {
    let db = setup_database(shared_test_cluster, "list_deadline");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    rt.block_on(repo.store(&task_due("later", 1500)))
        .expect("store succeeds");
    rt.block_on(repo.store(&task_due("earlier", 1000)))
        .expect("store succeeds");
    let query = fetch_query(&ListParams::default().with_sort(sort));

    let listed = rt.block_on(repo.list(&query)).expect("list succeeds");

    assert_eq!(names(&listed), expected);
    let after_first = Filter::parse(&json!({ "deadline": { "$gt": "1970-01-01T00:00:01.000Z" } }))
        .expect("valid filter");
    assert_eq!(
        rt.block_on(repo.count(&after_first)).expect("count succeeds"),
        1
    );
}

#[rstest]
fn string_ranges_compare_bytewise(shared_test_cluster: &'static TestCluster) {
    let db = setup_database(shared_test_cluster, "list_collation");
    let repo = PostgresTaskRepository::new(db.pool());
    let rt = test_runtime();
    rt.block_on(repo.store(&task_due("B", 1000)))
        .expect("store succeeds");
    rt.block_on(repo.store(&task_due("a", 1000)))
        .expect("store succeeds");
    let query = fetch_query(
        &ListParams::default()
            .with_where(r#"{"name":{"$gt":"Z"}}"#)
            .with_sort(r#"{"name":1}"#),
    );

    let listed = rt.block_on(repo.list(&query)).expect("list succeeds");

    assert_eq!(names(&listed), ["a"]);
    let everything = fetch_query(&ListParams::default().with_sort(r#"{"name":1}"#));
    let sorted = rt.block_on(repo.list(&everything)).expect("list succeeds");
    assert_eq!(names(&sorted), ["B", "a"]);
}
