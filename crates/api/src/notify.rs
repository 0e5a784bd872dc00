//! Best-effort notification delivery.
//!
//! Notification inserts must never fail the operation that triggered
//! them: failures are logged and discarded.

use database::models::NewNotification;
use database::{notification, Database};
use tracing::warn;

/// Notify one user; errors are swallowed.
pub async fn notify_user(db: &Database, user_id: i64, note: NewNotification) {
    if let Err(err) = notification::create(db.pool(), user_id, &note).await {
        warn!(user_id, error = %err, "Notification create failed");
    }
}

/// Notify every admin; errors are swallowed.
pub async fn notify_admins(db: &Database, note: NewNotification) {
    if let Err(err) = notification::notify_admins(db.pool(), &note).await {
        warn!(error = %err, "Admin notification fan-out failed");
    }
}

/// Shorthand for a system notification tied to a request.
pub fn system_note(title: &str, message: String, request_id: Option<i64>) -> NewNotification {
    NewNotification {
        title: title.to_string(),
        message,
        notification_type: "system".to_string(),
        related_request_id: request_id,
        related_payment_id: None,
    }
}
