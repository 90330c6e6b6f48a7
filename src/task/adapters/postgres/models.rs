//! Diesel row models for task documents.

use crate::store::schema::tasks;
use diesel::prelude::*;
use serde_json::Value;

/// Insert model for task records. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Serialised task document.
    pub document: Value,
}
