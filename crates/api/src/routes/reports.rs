//! Visit report endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use database::{report, ReportListing, Role};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{require_role, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportInput {
    request_id: i64,
    report_text: String,
    #[serde(default, alias = "report_date")]
    date: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ReportInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(user, Role::Guide)?;

    let text = input.report_text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation(
            "request_id and report_text are required".to_string(),
        ));
    }
    let date = input
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());

    let report_id =
        report::create_report(state.db.pool(), user.id, input.request_id, text, &date).await?;

    Ok(Json(json!({
        "message": "Report submitted successfully",
        "report_id": report_id,
    })))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ReportListing>>, ApiError> {
    require_role(user, Role::Admin)?;

    let reports = report::list_reports(state.db.pool()).await?;
    Ok(Json(reports))
}
