//! Query translation shared by the user and task collections.
//!
//! Raw `where`, `sort`, `select`, `skip`, `limit` and `count` request
//! parameters are translated into a [`domain::RecordQuery`] or a count
//! request. The translated query is store-agnostic: the in-memory adapters
//! evaluate it directly and the `PostgreSQL` adapters compile it to SQL.

pub mod domain;
mod translator;

pub use domain::{Document, Filter, QueryError, RecordQuery};
pub use translator::{ListOutcome, ListParams, ListRequest, QueryTranslator};
