//! Task collection.
//!
//! Tasks carry an optional assignment to a user. Creating, replacing and
//! deleting a task keeps the assigned user's `pendingTasks` list in step.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Collection service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
