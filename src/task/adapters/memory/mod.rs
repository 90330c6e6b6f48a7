//! In-memory adapter for task persistence.
//!
//! Evaluates list queries directly over serialised task documents; suitable
//! for tests and for running the service without a database.

mod task;

pub use task::InMemoryTaskRepository;
