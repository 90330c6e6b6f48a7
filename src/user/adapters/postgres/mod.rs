//! `PostgreSQL` adapter for user documents.

mod models;
mod repository;

pub use repository::PostgresUserRepository;
