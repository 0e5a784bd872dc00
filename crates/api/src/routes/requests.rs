//! Guide-request lifecycle endpoints.

use axum::extract::{Path, State};
use axum::Json;
use database::{guide_request, GuideRequest, RequestListing, RequestStatus, Role};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{require_role, AuthUser};
use crate::error::ApiError;
use crate::notify::{self, system_note};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequestInput {
    site_id: i64,
    preferred_date: String,
    #[serde(default, alias = "number_of_visitors")]
    group_size: Option<i64>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignGuideInput {
    #[serde(alias = "assigned_guide_id")]
    guide_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    status: String,
}

/// Role-scoped listing: admins see everything, visitors their own,
/// guides what they can act on.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<RequestListing>>, ApiError> {
    let requests = match user.role {
        Role::Admin => guide_request::list_requests(state.db.pool()).await?,
        Role::Visitor => {
            guide_request::list_requests_for_visitor(state.db.pool(), user.id).await?
        }
        Role::Guide => guide_request::list_requests_for_guide(state.db.pool(), user.id).await?,
        Role::Researcher => {
            return Err(ApiError::Forbidden(
                "access denied for this role".to_string(),
            ))
        }
    };
    Ok(Json(requests))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateRequestInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(user, Role::Visitor)?;

    if input.preferred_date.trim().is_empty() {
        return Err(ApiError::Validation("preferred_date is required".to_string()));
    }
    let group_size = input.group_size.unwrap_or(1);
    if group_size < 1 {
        return Err(ApiError::Validation("group_size must be at least 1".to_string()));
    }

    let request_id = guide_request::create_request(
        state.db.pool(),
        user.id,
        input.site_id,
        input.preferred_date.trim(),
        group_size,
        input.notes.as_deref(),
    )
    .await?;

    notify::notify_admins(
        &state.db,
        system_note(
            "New Guide Request",
            format!("A new guide request #{request_id} has been submitted."),
            Some(request_id),
        ),
    )
    .await;

    Ok(Json(json!({
        "message": "Request submitted",
        "request_id": request_id,
    })))
}

pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<GuideRequest>, ApiError> {
    require_role(user, Role::Admin)?;

    let request = guide_request::approve_request(state.db.pool(), id).await?;

    notify::notify_user(
        &state.db,
        request.visitor_id,
        system_note(
            "Request Approved",
            format!("Your guide request #{id} has been approved."),
            Some(id),
        ),
    )
    .await;

    Ok(Json(request))
}

pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<GuideRequest>, ApiError> {
    require_role(user, Role::Admin)?;

    let request = guide_request::reject_request(state.db.pool(), id).await?;

    notify::notify_user(
        &state.db,
        request.visitor_id,
        system_note(
            "Request Rejected",
            format!("Your guide request #{id} has been rejected."),
            Some(id),
        ),
    )
    .await;

    Ok(Json(request))
}

pub async fn assign_guide(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<AssignGuideInput>,
) -> Result<Json<GuideRequest>, ApiError> {
    require_role(user, Role::Admin)?;

    let request = guide_request::assign_guide(state.db.pool(), id, input.guide_id).await?;

    notify::notify_user(
        &state.db,
        input.guide_id,
        system_note(
            "New Assignment",
            format!("You have been assigned to guide request #{id}."),
            Some(id),
        ),
    )
    .await;

    Ok(Json(request))
}

/// Guide accept/reject/complete, and visitor cancellation.
pub async fn set_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<StatusInput>,
) -> Result<Json<GuideRequest>, ApiError> {
    let Some(target) = RequestStatus::parse_label(&input.status) else {
        return Err(ApiError::Validation(format!(
            "unknown request status '{}'",
            input.status
        )));
    };

    let request = match user.role {
        Role::Guide => {
            let request =
                guide_request::guide_set_status(state.db.pool(), id, user.id, target).await?;

            let title = match target {
                RequestStatus::AcceptedByGuide => "Request Accepted by Guide",
                RequestStatus::RejectedByGuide => "Request Rejected by Guide",
                RequestStatus::Completed => "Visit Completed",
                _ => "Request Updated",
            };
            notify::notify_admins(
                &state.db,
                system_note(
                    title,
                    format!("Guide request #{id} is now '{target}'."),
                    Some(id),
                ),
            )
            .await;

            request
        }
        Role::Visitor if target == RequestStatus::Cancelled => {
            guide_request::cancel_request(state.db.pool(), id, user.id).await?
        }
        _ => {
            return Err(ApiError::Forbidden(
                "access denied for this role".to_string(),
            ))
        }
    };

    Ok(Json(request))
}

pub async fn destroy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(user, Role::Admin)?;

    guide_request::delete_request(state.db.pool(), id).await?;

    Ok(Json(json!({ "message": "Request deleted" })))
}
