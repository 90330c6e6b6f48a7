//! Handlers for `/api/users`.

use super::{
    envelope::{Envelope, respond},
    error::ApiErrorResponse,
    list_response,
    router::AppState,
};
use crate::query::ListParams;
use crate::user::{
    domain::UserId,
    services::{UserServiceError, UserWriteRequest},
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

fn parse_id(raw: &str) -> Result<UserId, ApiErrorResponse> {
    raw.parse::<UserId>().map_err(|err| {
        ApiErrorResponse::from_failure(&UserServiceError::from(err), "Invalid user ID")
    })
}

pub(super) async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let Query(list_params) = params?;
    let outcome = state
        .users
        .list(&list_params)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to fetch users"))?;
    Ok(list_response(
        outcome,
        "User count retrieved successfully",
        "Users retrieved successfully",
    ))
}

pub(super) async fn create(
    State(state): State<AppState>,
    body: Result<Json<UserWriteRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let Json(request) = body?;
    let user = state
        .users
        .create(request)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to create user"))?;
    Ok(respond(
        StatusCode::CREATED,
        Envelope::with_data("User created successfully", user),
    ))
}

pub(super) async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let id = parse_id(&raw_id)?;
    let user = state
        .users
        .get(id)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to fetch user"))?;
    Ok(respond(
        StatusCode::OK,
        Envelope::with_data("User retrieved successfully", user),
    ))
}

pub(super) async fn replace(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UserWriteRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let id = parse_id(&raw_id)?;
    let Json(request) = body?;
    let user = state
        .users
        .replace(id, request)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to update user"))?;
    Ok(respond(
        StatusCode::OK,
        Envelope::with_data("User updated successfully", user),
    ))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let id = parse_id(&raw_id)?;
    let user = state
        .users
        .delete(id)
        .await
        .map_err(|err| ApiErrorResponse::from_failure(&err, "Failed to delete user"))?;
    Ok(respond(
        StatusCode::OK,
        Envelope::with_data("User deleted successfully", user),
    ))
}
