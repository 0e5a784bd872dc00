//! Route table.

use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

mod auth;
mod notifications;
mod payments;
mod reports;
mod requests;
mod sites;
mod users;

#[derive(Debug, Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/sites", get(sites::list).post(sites::create))
        .route("/sites/:id", get(sites::show).patch(sites::update).delete(sites::destroy))
        .route("/sites/:id/approve", patch(sites::approve))
        .route("/requests", get(requests::list).post(requests::create))
        .route("/requests/:id/approve", patch(requests::approve))
        .route("/requests/:id/reject", patch(requests::reject))
        .route("/requests/:id/assign-guide", patch(requests::assign_guide))
        .route("/requests/:id/status", patch(requests::set_status))
        .route("/requests/:id", delete(requests::destroy))
        .route("/reports", post(reports::create))
        .route("/admin/reports", get(reports::list))
        .route("/notifications", get(notifications::list))
        .route("/notifications/:id/read", patch(notifications::mark_read))
        .route("/notifications/:id", delete(notifications::destroy))
        .route("/payments", get(payments::list))
        .route("/payments/:id/verify", patch(payments::verify_manual))
        .route("/payments/chapa/create", post(payments::chapa_create))
        .route("/payments/chapa/verify/:tx_ref", get(payments::chapa_verify))
        .route("/admin/users", get(users::list).post(users::create))
        .route("/admin/users/:id/status", put(users::set_status))
        .route("/admin/users/:id", delete(users::destroy))
        .route("/users/me", patch(users::update_me))
        .with_state(state)
}
