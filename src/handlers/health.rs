use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::router::AppState;

/// POST /health-check -> service banner. Does not touch the database.
pub async fn health_check() -> &'static str {
    "AI Assistant Backend V1 APIs"
}

/// GET /health/db -> runs a `SELECT 1` probe through the pool.
pub async fn db_health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.storage.health_check().await?;
    Ok(Json(json!({ "database": "ok" })))
}
