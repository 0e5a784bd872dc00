//! Site catalog endpoints.
//!
//! Input accepts both historical field spellings (`site_name`/`name`,
//! `location`/`location_address`, `price`/`visit_price`, ...) and maps
//! them onto the canonical columns.

use axum::extract::{Path, State};
use axum::Json;
use database::site::{self, NewSite, SiteChanges};
use database::{activity, lookup, site_image, Role, SiteListing, SiteStatus};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::auth::{require_any_role, require_role, AuthUser};
use crate::error::ApiError;
use crate::notify::{self, system_note};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SiteInput {
    #[serde(alias = "name", alias = "title")]
    site_name: Option<String>,
    #[serde(alias = "full_description")]
    description: Option<String>,
    short_description: Option<String>,
    #[serde(alias = "location_address")]
    location: Option<String>,
    #[serde(alias = "visit_price")]
    price: Option<f64>,
    #[serde(alias = "estimated_duration")]
    visit_duration: Option<String>,
    #[serde(alias = "image_url")]
    image: Option<String>,
    map_url: Option<String>,
    nearby_attractions: Option<String>,
    category: Option<String>,
    region: Option<String>,
    category_id: Option<i64>,
    region_id: Option<i64>,
    is_approved: Option<bool>,
    status: Option<String>,
}

fn parse_status(status: Option<&str>) -> Result<Option<SiteStatus>, ApiError> {
    match status {
        None => Ok(None),
        Some("pending") => Ok(Some(SiteStatus::Pending)),
        Some("approved") => Ok(Some(SiteStatus::Approved)),
        Some("rejected") => Ok(Some(SiteStatus::Rejected)),
        Some(other) => Err(ApiError::Validation(format!("unknown site status '{other}'"))),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<SiteListing>>, ApiError> {
    let sites = site::list_sites(state.db.pool()).await?;
    Ok(Json(sites))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SiteListing>, ApiError> {
    let site = site::get_site(state.db.pool(), id).await?;
    Ok(Json(site))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SiteInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_any_role(user, &[Role::Researcher, Role::Admin])?;

    let site_name = input
        .site_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("site_name is required".to_string()))?
        .to_string();

    // Lookup resolution is best-effort on create: a failed upsert leaves
    // the reference empty rather than aborting the submission.
    let category_id = match (&input.category_id, &input.category) {
        (Some(id), _) => Some(*id),
        (None, Some(name)) if !name.trim().is_empty() => {
            match lookup::ensure_category(state.db.pool(), name).await {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(error = %err, "Category upsert failed");
                    None
                }
            }
        }
        _ => None,
    };
    let region_id = match (&input.region_id, &input.region) {
        (Some(id), _) => Some(*id),
        (None, Some(name)) if !name.trim().is_empty() => {
            match lookup::ensure_region(state.db.pool(), name).await {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(error = %err, "Region upsert failed");
                    None
                }
            }
        }
        _ => None,
    };

    let new_site = NewSite {
        site_name: site_name.clone(),
        full_description: input.description.clone(),
        short_description: input
            .short_description
            .clone()
            .or_else(|| input.description.as_deref().map(|d| truncate_chars(d, 255))),
        location_address: input.location.clone(),
        visit_price: input.price,
        estimated_duration: input.visit_duration.clone(),
        image_url: input.image.clone(),
        map_url: input.map_url.clone(),
        nearby_attractions: input.nearby_attractions.clone(),
        category_id,
        region_id,
        is_approved: input.is_approved,
        status: parse_status(input.status.as_deref())?,
    };

    let site_id = site::create_site(state.db.pool(), Some(user.id), &new_site).await?;

    if let Some(image) = input.image.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
        if let Err(err) =
            site_image::insert_primary(state.db.pool(), site_id, image, Some(user.id)).await
        {
            warn!(site_id, error = %err, "Primary image insert failed");
        }
    }

    if let Err(err) = activity::log_activity(
        state.db.pool(),
        Some(user.id),
        "add_site",
        &format!("Added new site: {site_name}"),
        Some(site_id),
    )
    .await
    {
        warn!(site_id, error = %err, "Activity log failed");
    }

    notify::notify_admins(
        &state.db,
        system_note(
            "New Site Submitted",
            format!("A new site '{site_name}' has been submitted (auto-approved)."),
            None,
        ),
    )
    .await;

    Ok(Json(json!({
        "message": "Site saved successfully",
        "site_id": site_id,
        "is_approved": new_site.is_approved.unwrap_or(true),
        "status": new_site.status.unwrap_or(SiteStatus::Approved),
    })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<SiteInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_any_role(user, &[Role::Researcher, Role::Admin])?;

    let category_id = match (&input.category_id, &input.category) {
        (Some(id), _) => Some(*id),
        (None, Some(name)) if !name.trim().is_empty() => {
            Some(lookup::ensure_category(state.db.pool(), name).await?)
        }
        _ => None,
    };
    let region_id = match (&input.region_id, &input.region) {
        (Some(id), _) => Some(*id),
        (None, Some(name)) if !name.trim().is_empty() => {
            Some(lookup::ensure_region(state.db.pool(), name).await?)
        }
        _ => None,
    };

    if let Some(image) = input.image.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
        site_image::set_primary(state.db.pool(), id, image, Some(user.id)).await?;
    }

    let changes = SiteChanges {
        site_name: input.site_name.clone(),
        full_description: input.description.clone(),
        short_description: input.short_description.clone(),
        location_address: input.location.clone(),
        visit_price: input.price,
        estimated_duration: input.visit_duration.clone(),
        image_url: input.image.clone(),
        map_url: input.map_url.clone(),
        nearby_attractions: input.nearby_attractions.clone(),
        category_id,
        region_id,
        is_approved: input.is_approved,
        status: parse_status(input.status.as_deref())?,
    };

    site::update_site(state.db.pool(), id, &changes).await?;

    Ok(Json(json!({
        "message": "Site updated successfully",
        "site_id": id,
    })))
}

pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(user, Role::Admin)?;

    let site = site::approve_site(state.db.pool(), id).await?;

    if let Some(creator) = site.created_by {
        notify::notify_user(
            &state.db,
            creator,
            system_note(
                "Site Approved",
                format!("Your site '{}' has been approved by admin.", site.site_name),
                None,
            ),
        )
        .await;
    }

    Ok(Json(json!({
        "message": "Site approved",
        "site_id": id,
        "approved_by": user.id,
    })))
}

pub async fn destroy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(user, Role::Admin)?;

    site::delete_site(state.db.pool(), id).await?;

    Ok(Json(json!({ "message": "Site deleted" })))
}
