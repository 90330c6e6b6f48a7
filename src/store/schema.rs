//! Diesel schema and bootstrap DDL for the document tables.

use diesel::prelude::*;

diesel::table! {
    /// User documents.
    users (id) {
        /// Store-generated user identifier.
        id -> Uuid,
        /// Full user document as served to clients.
        document -> Jsonb,
        /// Insertion sequence used as the natural order.
        seq -> Int8,
    }
}

diesel::table! {
    /// Task documents.
    tasks (id) {
        /// Store-generated task identifier.
        id -> Uuid,
        /// Full task document as served to clients.
        document -> Jsonb,
        /// Insertion sequence used as the natural order.
        seq -> Int8,
    }
}

/// Name of the unique index enforcing one user per email address.
pub const USER_EMAIL_UNIQUE_INDEX: &str = "idx_users_email_unique";

const BOOTSTRAP_STATEMENTS: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS users (\
        id UUID PRIMARY KEY, \
        document JSONB NOT NULL, \
        seq BIGSERIAL NOT NULL)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_unique ON users ((document->>'email'))",
    "CREATE TABLE IF NOT EXISTS tasks (\
        id UUID PRIMARY KEY, \
        document JSONB NOT NULL, \
        seq BIGSERIAL NOT NULL)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_assigned_user ON tasks ((document->>'assignedUser'))",
    "CREATE INDEX IF NOT EXISTS idx_users_pending_tasks ON users USING GIN ((document->'pendingTasks'))",
];

/// Creates the document tables and indexes when they do not exist.
///
/// # Errors
///
/// Returns the Diesel error of the first statement that fails.
pub fn ensure_schema(connection: &mut PgConnection) -> QueryResult<()> {
    for statement in BOOTSTRAP_STATEMENTS {
        diesel::sql_query(statement).execute(connection)?;
    }
    Ok(())
}
