//! Handlers for `/api/tasks`.

use super::{
    envelope::{Envelope, respond},
    error::ApiErrorResponse,
    list_response,
    router::AppState,
};
use crate::query::ListParams;
use crate::task::{
    domain::TaskId,
    services::{TaskServiceError, TaskWriteRequest},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
};

fn parse_id(raw: &str) -> Result<TaskId, ApiErrorResponse> {
    raw.parse::<TaskId>().map_err(|err| {
        ApiErrorResponse::from_failure(&TaskServiceError::from(err), "Invalid task ID")
    })
}

pub(super) async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let Query(list_params) = params?;
    let outcome = state
        .tasks
        .list(&list_params)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to fetch tasks"))?;
    Ok(list_response(
        outcome,
        "Task count retrieved",
        "Tasks retrieved successfully",
    ))
}

pub(super) async fn create(
    State(state): State<AppState>,
    body: Result<Json<TaskWriteRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let Json(request) = body?;
    let task = state
        .tasks
        .create(request)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Server error creating task"))?;
    Ok(respond(
        StatusCode::CREATED,
        Envelope::with_data("Task created successfully", task),
    ))
}

pub(super) async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let id = parse_id(&raw_id)?;
    let task = state
        .tasks
        .get(id)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to fetch task"))?;
    Ok(respond(
        StatusCode::OK,
        Envelope::with_data("Task retrieved successfully", task),
    ))
}

pub(super) async fn replace(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<TaskWriteRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let id = parse_id(&raw_id)?;
    let Json(request) = body?;
    let task = state
        .tasks
        .replace(id, request)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Server error updating task"))?;
    Ok(respond(
        StatusCode::OK,
        Envelope::with_data("Task updated successfully", task),
    ))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let id = parse_id(&raw_id)?;
    let task = state
        .tasks
        .delete(id)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Server error deleting task"))?;
    Ok(respond(
        StatusCode::OK,
        Envelope::with_data("Task deleted successfully", task),
    ))
}
