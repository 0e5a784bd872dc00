//! Payment endpoints: local payment records plus the Chapa pass-through.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chapa_proxy::{ChapaClient, CheckoutRequest, VerifyStatus};
use database::models::NewNotification;
use database::{guide_request, payment, user, Payment, PaymentStatus, Role};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{require_role, AuthUser};
use crate::error::ApiError;
use crate::notify;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChapaCreateInput {
    request_id: i64,
    amount: f64,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    tx_ref: Option<String>,
    #[serde(default)]
    return_url: Option<String>,
    #[serde(default)]
    callback_url: Option<String>,
}

fn gateway(state: &AppState) -> Result<Arc<ChapaClient>, ApiError> {
    state
        .chapa
        .clone()
        .ok_or_else(|| ApiError::Internal("Chapa gateway not configured".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = match auth.role {
        Role::Admin => payment::list_payments(state.db.pool()).await?,
        Role::Visitor => payment::list_payments_for_visitor(state.db.pool(), auth.id).await?,
        _ => {
            return Err(ApiError::Forbidden(
                "access denied for this role".to_string(),
            ))
        }
    };
    Ok(Json(payments))
}

/// Admin marks a payment confirmed without the gateway (manual transfer).
pub async fn verify_manual(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(user, Role::Admin)?;

    payment::set_status(state.db.pool(), id, PaymentStatus::Confirmed).await?;

    Ok(Json(json!({
        "message": "Payment verified",
        "payment_id": id,
    })))
}

/// Start a hosted checkout for one of the visitor's requests.
pub async fn chapa_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChapaCreateInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(auth, Role::Visitor)?;

    if input.amount <= 0.0 {
        return Err(ApiError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }

    let request = guide_request::get_request(state.db.pool(), input.request_id).await?;
    if request.visitor_id != auth.id {
        return Err(ApiError::Forbidden(
            "request belongs to another visitor".to_string(),
        ));
    }

    let client = gateway(&state)?;
    let visitor = user::get_user(state.db.pool(), auth.id).await?;

    let tx_ref = input
        .tx_ref
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("tourism-{}", Uuid::new_v4()));
    let currency = input.currency.unwrap_or_else(|| "ETB".to_string());

    let payment_id = payment::create_payment(
        state.db.pool(),
        input.request_id,
        input.amount,
        &currency,
        "chapa",
        &tx_ref,
    )
    .await?;

    let checkout = CheckoutRequest {
        amount: input.amount,
        currency,
        email: input.email.unwrap_or_else(|| visitor.email.clone()),
        first_name: input.first_name.unwrap_or_else(|| visitor.first_name.clone()),
        last_name: input.last_name.unwrap_or_else(|| visitor.last_name.clone()),
        tx_ref: Some(tx_ref.clone()),
        return_url: input.return_url,
        callback_url: input.callback_url,
    };

    let started = match client.initialize(checkout).await {
        Ok(started) => started,
        Err(err) => {
            // The local row keeps the failed attempt visible.
            if let Err(db_err) =
                payment::set_status(state.db.pool(), payment_id, PaymentStatus::Failed).await
            {
                warn!(payment_id, error = %db_err, "Failed to mark payment failed");
            }
            return Err(err.into());
        }
    };

    Ok(Json(json!({
        "message": "Checkout created",
        "checkout_url": started.checkout_url,
        "tx_ref": started.tx_ref,
        "payment_id": payment_id,
    })))
}

/// Verify a transaction with the gateway and reconcile the local row.
pub async fn chapa_verify(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tx_ref): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let client = gateway(&state)?;

    let outcome = client.verify(&tx_ref).await?;
    let status = match outcome.status {
        VerifyStatus::Confirmed => PaymentStatus::Confirmed,
        VerifyStatus::Failed => PaymentStatus::Failed,
        VerifyStatus::Pending => PaymentStatus::PendingVerification,
    };

    let updated = payment::set_status_by_tx_ref(state.db.pool(), &tx_ref, status).await?;

    if updated.status == PaymentStatus::Confirmed {
        notify::notify_admins(
            &state.db,
            NewNotification {
                title: "Payment Confirmed".to_string(),
                message: format!(
                    "Payment for guide request #{} has been confirmed ({} {}).",
                    updated.request_id, updated.amount, updated.currency
                ),
                notification_type: "payment".to_string(),
                related_request_id: Some(updated.request_id),
                related_payment_id: Some(updated.payment_id),
            },
        )
        .await;
    }

    Ok(Json(json!({
        "tx_ref": updated.tx_ref,
        "status": updated.status,
        "payment_id": updated.payment_id,
    })))
}
