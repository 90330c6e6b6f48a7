//! In-memory adapter for user persistence.

mod user;

pub use user::InMemoryUserRepository;
