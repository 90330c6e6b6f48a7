//! Diesel row models for user documents.

use crate::store::schema::users;
use diesel::prelude::*;
use serde_json::Value;

/// Insert model for user records. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Serialised user document.
    pub document: Value,
}
