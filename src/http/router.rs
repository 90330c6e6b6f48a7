//! Application state and route table.

use std::sync::Arc;

use super::{envelope::Envelope, error::ApiErrorResponse, tasks, users};
use crate::task::{
    adapters::memory::InMemoryTaskRepository, ports::TaskRepository, services::TaskService,
};
use crate::user::{
    adapters::memory::InMemoryUserRepository, ports::UserRepository, services::UserService,
};
use axum::{Json, Router, routing::get};
use mockable::DefaultClock;
use tower_http::trace::TraceLayer;

/// Task service wired to type-erased repositories.
pub type SharedTaskService = TaskService<dyn TaskRepository, dyn UserRepository, DefaultClock>;

/// User service wired to type-erased repositories.
pub type SharedUserService = UserService<dyn UserRepository, dyn TaskRepository, DefaultClock>;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Task collection operations.
    pub tasks: SharedTaskService,
    /// User collection operations.
    pub users: SharedUserService,
}

impl AppState {
    /// Wires both services over the same pair of repositories.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, tasks: Arc<dyn TaskRepository>) -> Self {
        let clock = Arc::new(DefaultClock);
        Self {
            tasks: TaskService::new(Arc::clone(&tasks), Arc::clone(&users), Arc::clone(&clock)),
            users: UserService::new(users, tasks, clock),
        }
    }

    /// State backed by fresh in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
        )
    }
}

/// Builds the `/api` router with request tracing.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(home))
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::replace).delete(users::delete),
        )
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/{id}",
            get(tasks::get).put(tasks::replace).delete(tasks::delete),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
async fn home() -> Json<Envelope<()>> {
    Json(Envelope::empty("OK"))
}

#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
async fn not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found("Route not found")
}
