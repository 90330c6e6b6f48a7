//! Domain model for task records.
//!
//! A task may be assigned to one user. The assignment carries a snapshot of
//! the user's name taken when the assignment was written; keeping the
//! snapshot and the user's pending list aligned is the job of the collection
//! services.

mod deadline;
mod error;
mod ids;
mod task;

pub use deadline::DeadlineInput;
pub use error::TaskDomainError;
pub use ids::TaskId;
pub use task::{Assignment, Task, TaskDetails, UNASSIGNED_NAME};
