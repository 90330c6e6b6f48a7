//! Unit tests for the task collection.

mod cascade_failure_tests;
