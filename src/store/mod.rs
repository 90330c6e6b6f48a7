//! Shared `PostgreSQL` plumbing for the document-backed adapters.
//!
//! Users and tasks are stored as JSONB documents keyed by identifier, with a
//! sequence column providing the natural (insertion) order that unsorted
//! list queries return.

pub mod blocking;
pub mod schema;
pub mod sql;

pub use blocking::{PgPool, PooledConn, build_pool};
pub use schema::ensure_schema;
