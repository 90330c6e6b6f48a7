//! Shared set-up for the embedded `PostgreSQL` repository tests.

use diesel::prelude::*;
use diesel::sql_types::{Jsonb, Uuid as SqlUuid};
use pg_embedded_setup_unpriv::TestCluster;
use serde_json::Value;
use taskroster::store::{PgPool, build_pool, ensure_schema};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Template database holding the bootstrap schema.
const TEMPLATE_DB: &str = "taskroster_test_template";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates a tokio runtime for driving repository futures.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            ensure_schema(&mut conn).map_err(|e| eyre::eyre!("schema bootstrap: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Drops the test database even when the test panics.
struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// A per-test database cloned from the template.
///
/// Fields drop in order, so the pool closes its connection before the guard
/// drops the database.
pub struct TestDatabase<'a> {
    pool: PgPool,
    _guard: CleanupGuard<'a>,
}

impl TestDatabase<'_> {
    /// Pool bound to this database.
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Inserts a raw task document, bypassing the domain model.
    pub fn insert_task_document(&self, document: &Value) {
        let mut conn = self.pool.get().expect("pooled connection");
        diesel::sql_query("INSERT INTO tasks (id, document) VALUES ($1, $2)")
            .bind::<SqlUuid, _>(Uuid::new_v4())
            .bind::<Jsonb, _>(document)
            .execute(&mut conn)
            .expect("raw insert succeeds");
    }
}

/// Clones the template into a fresh database named after `prefix`.
pub fn setup_database<'a>(cluster: &'a TestCluster, prefix: &str) -> TestDatabase<'a> {
    ensure_template(cluster).expect("template database is ready");
    let db_name = format!("{prefix}_{}", Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .expect("database cloned from template");
    let url = cluster.connection().database_url(&db_name);
    let guard = CleanupGuard { cluster, db_name };
    let pool = build_pool(&url, 1).expect("pool builds");
    TestDatabase {
        pool,
        _guard: guard,
    }
}
