use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::ApiError;
use crate::middleware::RequireAdminKey;
use crate::router::AppState;
use crate::types::users::{RoleBody, RoleProfile};

pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RoleProfile>>, ApiError> {
    Ok(Json(state.users.list_roles().await?))
}

/// PUT /roles/{name} -> create or update a role by its unique name.
pub async fn put_role(
    _auth: RequireAdminKey,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<RoleBody>,
) -> Result<Json<RoleProfile>, ApiError> {
    Ok(Json(state.users.upsert_role(&name, body).await?))
}
