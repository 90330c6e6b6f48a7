//! Persistence adapters for the user module.
//!
//! - [`memory::InMemoryUserRepository`]: thread-safe in-memory storage
//! - [`postgres::PostgresUserRepository`]: `PostgreSQL` JSONB document storage
//!   using Diesel

pub mod memory;
pub mod postgres;
