//! HTTP surface for the user and task collections.
//!
//! Every response, success or failure, is a JSON [`Envelope`] of the form
//! `{"message": ..., "data": ...}`. Service failures are classified through
//! [`crate::error::ClassifyError`] and rendered by [`ApiErrorResponse`].

mod envelope;
mod error;
mod router;
mod tasks;
mod users;

pub use envelope::{Envelope, respond};
pub use error::{ApiErrorResponse, status_for};
pub use router::{AppState, SharedTaskService, SharedUserService, build_router};

use crate::query::ListOutcome;
use axum::{http::StatusCode, response::Response};

/// Renders a list outcome: a bare number for counts, an array otherwise.
fn list_response(
    outcome: ListOutcome,
    count_message: &'static str,
    records_message: &'static str,
) -> Response {
    match outcome {
        ListOutcome::Count(total) => {
            respond(StatusCode::OK, Envelope::with_data(count_message, total))
        }
        ListOutcome::Records(records) => {
            respond(StatusCode::OK, Envelope::with_data(records_message, records))
        }
    }
}
