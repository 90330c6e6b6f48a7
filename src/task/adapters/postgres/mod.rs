//! `PostgreSQL` adapter for task documents.

mod models;
mod repository;

pub use repository::PostgresTaskRepository;
