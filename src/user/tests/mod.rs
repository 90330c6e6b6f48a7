//! Unit tests for the user collection.
