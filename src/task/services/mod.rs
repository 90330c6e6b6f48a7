//! Application services for the task collection.

mod collection;

pub use collection::{TaskService, TaskServiceError, TaskServiceResult, TaskWriteRequest};
