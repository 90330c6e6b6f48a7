//! Step definitions for the task assignment scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
