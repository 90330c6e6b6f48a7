//! Application services for the user collection.

mod collection;

pub use collection::{
    UserCascadeError, UserService, UserServiceError, UserServiceResult, UserWriteRequest,
};
