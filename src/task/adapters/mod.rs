//! Persistence adapters for the task module.
//!
//! - [`memory::InMemoryTaskRepository`]: thread-safe in-memory storage
//! - [`postgres::PostgresTaskRepository`]: `PostgreSQL` JSONB document storage
//!   using Diesel

pub mod memory;
pub mod postgres;
