//! `PostgreSQL` repository implementation for task documents.

use super::models::NewTaskRow;
use crate::query::{Document, Filter, RecordQuery};
use crate::store::{
    PgPool,
    blocking::{get_conn_with, run_blocking_with},
    schema::tasks,
    sql,
};
use crate::task::{
    domain::{Task, TaskId, UNASSIGNED_NAME},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Array, Text};
use serde_json::Value;

const TABLE: &str = "tasks";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, TaskRepositoryError::persistence)?;
                f(&mut connection)
            },
            TaskRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn list(&self, query: &RecordQuery) -> TaskRepositoryResult<Vec<Document>> {
        let owned_query = query.clone();
        self.run_blocking(move |connection| {
            let compiled = sql::select_documents(TABLE, &owned_query);
            let documents = sql::load_documents(connection, compiled)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(documents
                .into_iter()
                .map(|document| owned_query.project(document))
                .collect())
        })
        .await
    }

    async fn count(&self, filter: &Filter) -> TaskRepositoryResult<u64> {
        let compiled = sql::count_documents(TABLE, filter);
        self.run_blocking(move |connection| {
            sql::load_count(connection, compiled).map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let document = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(tasks::document)
                .first::<Value>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            document.map(document_to_task).transpose()
        })
        .await
    }

    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = NewTaskRow {
            id: task_id.into_inner(),
            document: task_to_document(task)?,
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let document = task_to_document(task)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(tasks::document.eq(document))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let document = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .returning(tasks::document)
                .get_result::<Value>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            document.map(document_to_task).transpose()
        })
        .await
    }

    async fn unassign_all_for_user(&self, user_id: UserId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let changed = diesel::sql_query(concat!(
                "UPDATE tasks SET document = document || ",
                "jsonb_build_object('assignedUser', '', 'assignedUserName', $1::text) ",
                "WHERE document->>'assignedUser' = $2",
            ))
            .bind::<Text, _>(UNASSIGNED_NAME)
            .bind::<Text, _>(user_id.to_string())
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(sql::affected_rows(changed))
        })
        .await
    }

    async fn assign_many(
        &self,
        task_ids: &[TaskId],
        user_id: UserId,
        user_name: &str,
    ) -> TaskRepositoryResult<u64> {
        if task_ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<uuid::Uuid> = task_ids.iter().map(|id| id.into_inner()).collect();
        let name = user_name.to_owned();

        self.run_blocking(move |connection| {
            let changed = diesel::sql_query(concat!(
                "UPDATE tasks SET document = document || ",
                "jsonb_build_object('assignedUser', $1::text, 'assignedUserName', $2::text) ",
                "WHERE id = ANY($3)",
            ))
            .bind::<Text, _>(user_id.to_string())
            .bind::<Text, _>(name)
            .bind::<Array<diesel::sql_types::Uuid>, _>(ids)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(sql::affected_rows(changed))
        })
        .await
    }
}

fn task_to_document(task: &Task) -> TaskRepositoryResult<Value> {
    serde_json::to_value(task).map_err(TaskRepositoryError::persistence)
}

fn document_to_task(document: Value) -> TaskRepositoryResult<Task> {
    serde_json::from_value(document).map_err(TaskRepositoryError::persistence)
}
