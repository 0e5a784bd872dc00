//! Notification endpoints (all scoped to the authenticated user).

use axum::extract::{Path, State};
use axum::Json;
use database::{notification, Notification};
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = notification::list_for_user(state.db.pool(), user.id).await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notification::mark_read(state.db.pool(), id, user.id).await?;
    Ok(Json(json!({ "message": "Notification marked as read" })))
}

pub async fn destroy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    notification::delete(state.db.pool(), id, user.id).await?;
    Ok(Json(json!({ "message": "Notification deleted" })))
}
