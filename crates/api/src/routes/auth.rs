//! Login.

use axum::extract::State;
use axum::Json;
use database::{user, User};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{issue_token, verify_password};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = match user::get_user_by_email(state.db.pool(), &payload.email).await {
        Ok(user) => user,
        Err(database::DatabaseError::NotFound { .. }) => return Err(ApiError::Unauthorized),
        Err(err) => return Err(err.into()),
    };

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized);
    }

    let token = issue_token(user.user_id, user.role, state.jwt_secret.expose_secret())?;

    info!(user_id = user.user_id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse { token, user }))
}
