//! Domain model for list queries.
//!
//! Every structured request parameter is parsed into a typed value here so
//! that adapters never see client-supplied JSON directly.

mod error;
mod filter;
mod projection;
mod record_query;
mod sort;
mod value;

pub use error::QueryError;
pub use filter::{Condition, Filter};
pub use projection::{ID_FIELD, Projection, ProjectionMode};
pub use record_query::RecordQuery;
pub use sort::{SortDirection, SortKey, SortSpec};
pub use value::{Document, compare, lookup, values_equal};
