//! Taskroster: a small REST service for users and the tasks assigned to them.
//!
//! Both collections support filtered, sorted, projected and paginated
//! listing driven by JSON-encoded query parameters. Assignment is kept
//! consistent in both directions: a task's `assignedUser` and the owning
//! user's `pendingTasks` are updated together by the collection services.
//!
//! # Architecture
//!
//! Each collection follows a hexagonal layout:
//!
//! - **Domain**: validated records and identifiers
//! - **Ports**: async repository traits
//! - **Adapters**: in-memory and `PostgreSQL` implementations
//! - **Services**: orchestration of writes and cross-collection cascades
//!
//! # Modules
//!
//! - [`query`]: translation of list parameters into store-agnostic queries
//! - [`task`]: task records and the task collection service
//! - [`user`]: user records and the user collection service
//! - [`store`]: shared `PostgreSQL` pool, schema and SQL compilation
//! - [`http`]: axum router and the response envelope
//! - [`config`]: environment configuration
//! - [`error`]: failure classification shared by both services
//! - [`timestamp`]: fixed-width document timestamps

pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod store;
pub mod task;
pub mod timestamp;
pub mod user;
