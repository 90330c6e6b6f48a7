//! Port contracts for user persistence.

pub mod repository;

pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
