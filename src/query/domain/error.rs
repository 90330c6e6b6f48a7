//! Error types for list-query translation.

use thiserror::Error;

/// Errors returned while translating request parameters into a query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A structured parameter was not valid JSON.
    #[error("parameter '{param}' is not valid JSON: {reason}")]
    InvalidJson {
        /// Name of the offending parameter.
        param: &'static str,
        /// Parser diagnostic.
        reason: String,
    },

    /// A structured parameter parsed but was not a JSON object.
    #[error("parameter '{0}' must be a JSON object")]
    NotAnObject(&'static str),

    /// The filter used an operator this translator does not support.
    #[error("unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    /// An operator received an operand of the wrong shape.
    #[error("invalid operand for {operator}: {reason}")]
    InvalidOperand {
        /// Operator whose operand was rejected.
        operator: String,
        /// Why the operand was rejected.
        reason: &'static str,
    },

    /// A sort direction was neither ascending nor descending.
    #[error("invalid sort direction for field '{0}'")]
    InvalidSortDirection(String),

    /// A projection value was neither an inclusion nor an exclusion flag.
    #[error("invalid projection value for field '{0}'")]
    InvalidProjectionValue(String),

    /// The projection mixed inclusion and exclusion.
    #[error("projection cannot mix inclusion and exclusion")]
    MixedProjection,

    /// A pagination parameter was not a non-negative integer.
    #[error("parameter '{param}' must be a non-negative integer, got '{value}'")]
    InvalidInteger {
        /// Name of the offending parameter.
        param: &'static str,
        /// Raw value supplied by the client.
        value: String,
    },
}
