use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::error::ApiError;
use crate::middleware::RequireAdminKey;
use crate::router::AppState;
use crate::types::users::{
    CreateUserRequest, ListParams, LoginRequest, UpdateUserRequest, UserPage, UserProfile,
};

pub async fn create_user(
    _auth: RequireAdminKey,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let profile = state.users.create(req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.users.get(id).await?))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<UserPage>, ApiError> {
    Ok(Json(state.users.list(params).await?))
}

pub async fn update_user(
    _auth: RequireAdminKey,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.users.update(id, req).await?))
}

/// DELETE deactivates rather than dropping the row; history and audit
/// trails stay intact.
pub async fn deactivate_user(
    _auth: RequireAdminKey,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.users.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.users.authenticate(req).await?))
}
