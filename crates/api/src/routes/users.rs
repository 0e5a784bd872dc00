//! User administration and profile endpoints.

use axum::extract::{Path, State};
use axum::Json;
use database::user::{self, ProfileChanges};
use database::{validation, NewUser, Role, User};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{hash_password, require_role, verify_password, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    email: String,
    password: String,
    #[serde(alias = "user_type")]
    role: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    current_password: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    require_role(auth, Role::Admin)?;

    let users = user::list_users(state.db.pool()).await?;
    Ok(Json(users))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateUserInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(auth, Role::Admin)?;

    let role = Role::parse_label(&input.role)
        .ok_or_else(|| ApiError::Validation(format!("unknown role '{}'", input.role)))?;

    validation::validate_name("first_name", &input.first_name)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_email(&input.email).map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_password(&input.password)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let new_user = NewUser {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.unwrap_or_default().trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash: hash_password(&input.password)?,
        role,
    };
    let user_id = user::create_user(state.db.pool(), &new_user).await?;

    Ok(Json(json!({
        "message": "User created",
        "user_id": user_id,
    })))
}

pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<StatusInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(auth, Role::Admin)?;

    user::set_active(state.db.pool(), id, input.is_active).await?;

    Ok(Json(json!({
        "message": "User status updated",
        "user_id": id,
        "is_active": input.is_active,
    })))
}

pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(auth, Role::Admin)?;

    user::delete_user(state.db.pool(), id).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}

/// Profile/password changes for the authenticated user. A password
/// change verifies the current password when one is supplied.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ProfileInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(email) = input.email.as_deref() {
        validation::validate_email(email).map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    let password_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
        Some(new_password) => {
            validation::validate_password(new_password)
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            if let Some(current) = input.current_password.as_deref() {
                let me = user::get_user(state.db.pool(), auth.id).await?;
                if !verify_password(current, &me.password_hash)? {
                    return Err(ApiError::Forbidden(
                        "current password is incorrect".to_string(),
                    ));
                }
            }
            Some(hash_password(new_password)?)
        }
        None => None,
    };

    let changes = ProfileChanges {
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        password_hash,
    };
    user::update_profile(state.db.pool(), auth.id, &changes).await?;

    Ok(Json(json!({ "message": "Profile updated" })))
}
