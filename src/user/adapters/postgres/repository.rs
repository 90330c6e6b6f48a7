//! `PostgreSQL` repository implementation for user documents.
//!
//! Email uniqueness is enforced by a unique expression index; violations of
//! that index surface as [`UserRepositoryError::DuplicateEmail`].

use super::models::NewUserRow;
use crate::query::{Document, Filter, RecordQuery};
use crate::store::{
    PgPool,
    blocking::{get_conn_with, run_blocking_with},
    schema::{USER_EMAIL_UNIQUE_INDEX, users},
    sql,
};
use crate::task::domain::TaskId;
use crate::user::{
    domain::{User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Array, Text};
use serde_json::Value;

const TABLE: &str = "users";

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, UserRepositoryError::persistence)?;
                f(&mut connection)
            },
            UserRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list(&self, query: &RecordQuery) -> UserRepositoryResult<Vec<Document>> {
        let owned_query = query.clone();
        self.run_blocking(move |connection| {
            let compiled = sql::select_documents(TABLE, &owned_query);
            let documents = sql::load_documents(connection, compiled)
                .map_err(UserRepositoryError::persistence)?;
            Ok(documents
                .into_iter()
                .map(|document| owned_query.project(document))
                .collect())
        })
        .await
    }

    async fn count(&self, filter: &Filter) -> UserRepositoryResult<u64> {
        let compiled = sql::count_documents(TABLE, filter);
        self.run_blocking(move |connection| {
            sql::load_count(connection, compiled).map_err(UserRepositoryError::persistence)
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let document = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(users::document)
                .first::<Value>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            document.map(document_to_user).transpose()
        })
        .await
    }

    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let user_id = user.id();
        let email = user.email().to_owned();
        let new_row = NewUserRow {
            id: user_id.into_inner(),
            document: user_to_document(user)?,
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        UserRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateUser(user_id)
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let user_id = user.id();
        let email = user.email().to_owned();
        let document = user_to_document(user)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(users::table.filter(users::id.eq(user_id.into_inner())))
                .set(users::document.eq(document))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        UserRepositoryError::DuplicateEmail(email.clone())
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            if updated == 0 {
                return Err(UserRepositoryError::NotFound(user_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let document = diesel::delete(users::table.filter(users::id.eq(id.into_inner())))
                .returning(users::document)
                .get_result::<Value>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            document.map(document_to_user).transpose()
        })
        .await
    }

    async fn add_pending_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> UserRepositoryResult<()> {
        self.run_blocking(move |connection| {
            diesel::sql_query(concat!(
                "UPDATE users SET document = jsonb_set(document, '{pendingTasks}', ",
                "COALESCE(document->'pendingTasks', '[]'::jsonb) || jsonb_build_array($1::text)) ",
                "WHERE id = $2 ",
                "AND NOT COALESCE(document->'pendingTasks', '[]'::jsonb) @> jsonb_build_array($1::text)",
            ))
            .bind::<Text, _>(task_id.to_string())
            .bind::<diesel::sql_types::Uuid, _>(user_id.into_inner())
            .execute(connection)
            .map_err(UserRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn remove_pending_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> UserRepositoryResult<()> {
        self.run_blocking(move |connection| {
            diesel::sql_query(concat!(
                "UPDATE users SET document = jsonb_set(document, '{pendingTasks}', COALESCE((",
                "SELECT jsonb_agg(entry ORDER BY position) ",
                "FROM jsonb_array_elements(document->'pendingTasks') ",
                "WITH ORDINALITY AS pending(entry, position) ",
                "WHERE entry <> to_jsonb($1::text)), '[]'::jsonb)) ",
                "WHERE id = $2 AND document->'pendingTasks' @> jsonb_build_array($1::text)",
            ))
            .bind::<Text, _>(task_id.to_string())
            .bind::<diesel::sql_types::Uuid, _>(user_id.into_inner())
            .execute(connection)
            .map_err(UserRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn release_tasks(&self, task_ids: &[TaskId], keep: UserId) -> UserRepositoryResult<u64> {
        if task_ids.is_empty() {
            return Ok(0);
        }
        let released: Vec<String> = task_ids.iter().map(ToString::to_string).collect();

        self.run_blocking(move |connection| {
            let changed = diesel::sql_query(concat!(
                "UPDATE users SET document = jsonb_set(document, '{pendingTasks}', COALESCE((",
                "SELECT jsonb_agg(entry ORDER BY position) ",
                "FROM jsonb_array_elements(document->'pendingTasks') ",
                "WITH ORDINALITY AS pending(entry, position) ",
                "WHERE NOT (entry #>> '{}' = ANY($1))), '[]'::jsonb)) ",
                "WHERE id <> $2 AND document->'pendingTasks' ?| $1",
            ))
            .bind::<Array<Text>, _>(released)
            .bind::<diesel::sql_types::Uuid, _>(keep.into_inner())
            .execute(connection)
            .map_err(UserRepositoryError::persistence)?;
            Ok(sql::affected_rows(changed))
        })
        .await
    }
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == USER_EMAIL_UNIQUE_INDEX)
}

fn user_to_document(user: &User) -> UserRepositoryResult<Value> {
    serde_json::to_value(user).map_err(UserRepositoryError::persistence)
}

fn document_to_user(document: Value) -> UserRepositoryResult<User> {
    serde_json::from_value(document).map_err(UserRepositoryError::persistence)
}
