//! Domain model for user records.
//!
//! A user owns a list of pending task references. The list is kept
//! consistent with each task's assignment by the collection services, not by
//! the user value itself.

mod error;
mod ids;
mod user;

pub use error::UserDomainError;
pub use ids::UserId;
pub use user::{User, UserProfile};
