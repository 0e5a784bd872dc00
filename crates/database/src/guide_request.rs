//! Guide-request lifecycle operations.
//!
//! Admin approval is gated server-side on a confirmed payment; guide
//! actions are gated on ownership of the assignment. Transition legality
//! itself lives in [`RequestStatus::transition_allowed`].

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{GuideRequest, RequestListing};
use crate::status::{RequestStatus, Role};

const REQUEST_COLUMNS: &str = "request_id, visitor_id, site_id, preferred_date, \
                               group_size, status, assigned_guide_id, notes, created_at";

const LISTING_SELECT: &str = r#"
    SELECT r.request_id, r.visitor_id, r.site_id, r.preferred_date,
           r.group_size, r.status, r.assigned_guide_id, r.notes, r.created_at,
           v.first_name || ' ' || v.last_name AS visitor_name,
           s.site_name AS site_name,
           s.visit_price AS amount
    FROM guide_requests r
    LEFT JOIN users v ON v.user_id = r.visitor_id
    LEFT JOIN sites s ON s.site_id = r.site_id
"#;

/// Create a pending request. Returns the generated id.
pub async fn create_request(
    pool: &SqlitePool,
    visitor_id: i64,
    site_id: i64,
    preferred_date: &str,
    group_size: i64,
    notes: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO guide_requests (visitor_id, site_id, preferred_date, group_size, notes)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(visitor_id)
    .bind(site_id)
    .bind(preferred_date)
    .bind(group_size)
    .bind(notes)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get a request by ID.
pub async fn get_request(pool: &SqlitePool, id: i64) -> Result<GuideRequest> {
    sqlx::query_as::<_, GuideRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM guide_requests WHERE request_id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "GuideRequest",
        id: id.to_string(),
    })
}

/// All requests joined with visitor name, site name, and price, newest first.
pub async fn list_requests(pool: &SqlitePool) -> Result<Vec<RequestListing>> {
    let requests = sqlx::query_as::<_, RequestListing>(&format!(
        "{LISTING_SELECT} ORDER BY r.created_at DESC, r.request_id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// A visitor's own requests.
pub async fn list_requests_for_visitor(
    pool: &SqlitePool,
    visitor_id: i64,
) -> Result<Vec<RequestListing>> {
    let requests = sqlx::query_as::<_, RequestListing>(&format!(
        "{LISTING_SELECT} WHERE r.visitor_id = ? ORDER BY r.created_at DESC, r.request_id DESC"
    ))
    .bind(visitor_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Requests a guide can act on: assigned to them, or unassigned and in a
/// guide-actionable state.
pub async fn list_requests_for_guide(
    pool: &SqlitePool,
    guide_id: i64,
) -> Result<Vec<RequestListing>> {
    let requests = sqlx::query_as::<_, RequestListing>(&format!(
        r#"{LISTING_SELECT}
        WHERE r.assigned_guide_id = ?
           OR (r.assigned_guide_id IS NULL AND r.status IN ('approved', 'assigned'))
        ORDER BY r.created_at DESC, r.request_id DESC"#
    ))
    .bind(guide_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Whether the request has at least one confirmed payment.
pub async fn has_confirmed_payment(pool: &SqlitePool, request_id: i64) -> Result<bool> {
    let found = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT 1 FROM payments
        WHERE request_id = ? AND status = 'confirmed'
        LIMIT 1
        "#,
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// Admin approval. Requires a confirmed payment; refuses otherwise
/// without touching the row.
pub async fn approve_request(pool: &SqlitePool, id: i64) -> Result<GuideRequest> {
    let request = get_request(pool, id).await?;

    if !request
        .status
        .transition_allowed(RequestStatus::Approved, Role::Admin)
    {
        return Err(DatabaseError::InvalidTransition {
            from: request.status,
            to: RequestStatus::Approved,
        });
    }

    if !has_confirmed_payment(pool, id).await? {
        return Err(DatabaseError::PaymentNotConfirmed { request_id: id });
    }

    set_status(pool, id, RequestStatus::Approved).await?;
    get_request(pool, id).await
}

/// Admin rejection, unconditional from pending or approved.
pub async fn reject_request(pool: &SqlitePool, id: i64) -> Result<GuideRequest> {
    let request = get_request(pool, id).await?;

    if !request
        .status
        .transition_allowed(RequestStatus::Rejected, Role::Admin)
    {
        return Err(DatabaseError::InvalidTransition {
            from: request.status,
            to: RequestStatus::Rejected,
        });
    }

    set_status(pool, id, RequestStatus::Rejected).await?;
    get_request(pool, id).await
}

/// Admin assigns a guide to an approved request.
pub async fn assign_guide(pool: &SqlitePool, id: i64, guide_id: i64) -> Result<GuideRequest> {
    let request = get_request(pool, id).await?;

    if !request
        .status
        .transition_allowed(RequestStatus::Assigned, Role::Admin)
    {
        return Err(DatabaseError::InvalidTransition {
            from: request.status,
            to: RequestStatus::Assigned,
        });
    }

    sqlx::query(
        r#"
        UPDATE guide_requests
        SET status = 'assigned', assigned_guide_id = ?
        WHERE request_id = ?
        "#,
    )
    .bind(guide_id)
    .bind(id)
    .execute(pool)
    .await?;

    get_request(pool, id).await
}

/// Guide-side transition (accept, reject, complete).
///
/// The acting guide must be the assigned one. A request with no guide
/// pinned yet can be claimed by any guide while it is `approved` or
/// `assigned`; acting on it stores the claimer.
pub async fn guide_set_status(
    pool: &SqlitePool,
    id: i64,
    guide_id: i64,
    to: RequestStatus,
) -> Result<GuideRequest> {
    let request = get_request(pool, id).await?;

    let owns = match request.assigned_guide_id {
        Some(assigned) => assigned == guide_id,
        None => matches!(
            request.status,
            RequestStatus::Approved | RequestStatus::Assigned
        ),
    };
    if !owns {
        return Err(DatabaseError::NotAssignedGuide {
            request_id: id,
            guide_id,
        });
    }

    if !request.status.transition_allowed(to, Role::Guide) {
        return Err(DatabaseError::InvalidTransition {
            from: request.status,
            to,
        });
    }

    sqlx::query(
        r#"
        UPDATE guide_requests
        SET status = ?, assigned_guide_id = ?
        WHERE request_id = ?
        "#,
    )
    .bind(to)
    .bind(guide_id)
    .bind(id)
    .execute(pool)
    .await?;

    get_request(pool, id).await
}

/// Visitor cancels their own pending request.
pub async fn cancel_request(pool: &SqlitePool, id: i64, visitor_id: i64) -> Result<GuideRequest> {
    let request = get_request(pool, id).await?;

    if request.visitor_id != visitor_id {
        // Other visitors' requests are invisible.
        return Err(DatabaseError::NotFound {
            entity: "GuideRequest",
            id: id.to_string(),
        });
    }

    if !request
        .status
        .transition_allowed(RequestStatus::Cancelled, Role::Visitor)
    {
        return Err(DatabaseError::InvalidTransition {
            from: request.status,
            to: RequestStatus::Cancelled,
        });
    }

    set_status(pool, id, RequestStatus::Cancelled).await?;
    get_request(pool, id).await
}

/// Delete a request and its payments, visits, and notifications in one
/// transaction.
pub async fn delete_request(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE related_payment_id IN (SELECT payment_id FROM payments WHERE request_id = ?)
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM notifications WHERE related_request_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM payments WHERE request_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM visits WHERE request_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM guide_requests WHERE request_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "GuideRequest",
            id: id.to_string(),
        });
    }

    tx.commit().await?;
    Ok(())
}

async fn set_status(pool: &SqlitePool, id: i64, status: RequestStatus) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE guide_requests
        SET status = ?
        WHERE request_id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment;
    use crate::site::{create_site, NewSite};
    use crate::status::PaymentStatus;
    use crate::test_support::{seed_user, test_db};
    use crate::Database;

    async fn seed_request(db: &Database) -> (i64, i64) {
        let visitor = seed_user(db, "visitor@example.com", Role::Visitor).await;
        let site_id = create_site(
            db.pool(),
            None,
            &NewSite {
                site_name: "Tiya Stelae".to_string(),
                visit_price: Some(200.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let request_id = create_request(db.pool(), visitor.user_id, site_id, "2026-10-01", 3, None)
            .await
            .unwrap();
        (request_id, visitor.user_id)
    }

    async fn confirm_payment_for(db: &Database, request_id: i64) {
        let payment_id =
            payment::create_payment(db.pool(), request_id, 200.0, "ETB", "chapa", "tx-seed")
                .await
                .unwrap();
        payment::set_status(db.pool(), payment_id, PaymentStatus::Confirmed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn approve_requires_confirmed_payment() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;

        let blocked = approve_request(db.pool(), request_id).await;
        assert!(matches!(
            blocked,
            Err(DatabaseError::PaymentNotConfirmed { .. })
        ));
        let request = get_request(db.pool(), request_id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        confirm_payment_for(&db, request_id).await;
        let approved = approve_request(db.pool(), request_id).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn reject_is_unconditional_and_reapprovable() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;

        let rejected = reject_request(db.pool(), request_id).await.unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);

        // Re-approval still demands the payment precondition.
        assert!(matches!(
            approve_request(db.pool(), request_id).await,
            Err(DatabaseError::PaymentNotConfirmed { .. })
        ));
        confirm_payment_for(&db, request_id).await;
        let approved = approve_request(db.pool(), request_id).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn assign_needs_approved_state() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;
        let guide = seed_user(&db, "guide@example.com", Role::Guide).await;

        let early = assign_guide(db.pool(), request_id, guide.user_id).await;
        assert!(matches!(
            early,
            Err(DatabaseError::InvalidTransition { .. })
        ));

        confirm_payment_for(&db, request_id).await;
        approve_request(db.pool(), request_id).await.unwrap();
        let assigned = assign_guide(db.pool(), request_id, guide.user_id)
            .await
            .unwrap();
        assert_eq!(assigned.status, RequestStatus::Assigned);
        assert_eq!(assigned.assigned_guide_id, Some(guide.user_id));
    }

    #[tokio::test]
    async fn only_the_assigned_guide_may_act() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;
        let guide = seed_user(&db, "guide@example.com", Role::Guide).await;
        let other = seed_user(&db, "other@example.com", Role::Guide).await;

        confirm_payment_for(&db, request_id).await;
        approve_request(db.pool(), request_id).await.unwrap();
        assign_guide(db.pool(), request_id, guide.user_id)
            .await
            .unwrap();

        let denied =
            guide_set_status(db.pool(), request_id, other.user_id, RequestStatus::AcceptedByGuide)
                .await;
        assert!(matches!(
            denied,
            Err(DatabaseError::NotAssignedGuide { .. })
        ));

        let accepted =
            guide_set_status(db.pool(), request_id, guide.user_id, RequestStatus::AcceptedByGuide)
                .await
                .unwrap();
        assert_eq!(accepted.status, RequestStatus::AcceptedByGuide);

        let completed =
            guide_set_status(db.pool(), request_id, guide.user_id, RequestStatus::Completed)
                .await
                .unwrap();
        assert_eq!(completed.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn unassigned_approved_request_can_be_claimed() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;
        let guide = seed_user(&db, "guide@example.com", Role::Guide).await;

        confirm_payment_for(&db, request_id).await;
        approve_request(db.pool(), request_id).await.unwrap();

        let claimed =
            guide_set_status(db.pool(), request_id, guide.user_id, RequestStatus::AcceptedByGuide)
                .await
                .unwrap();
        assert_eq!(claimed.status, RequestStatus::AcceptedByGuide);
        assert_eq!(claimed.assigned_guide_id, Some(guide.user_id));
    }

    #[tokio::test]
    async fn pending_requests_cannot_be_accepted() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;
        let guide = seed_user(&db, "guide@example.com", Role::Guide).await;

        let denied =
            guide_set_status(db.pool(), request_id, guide.user_id, RequestStatus::AcceptedByGuide)
                .await;
        assert!(matches!(
            denied,
            Err(DatabaseError::NotAssignedGuide { .. })
        ));
    }

    #[tokio::test]
    async fn visitor_cancels_own_pending_request_only() {
        let db = test_db().await;
        let (request_id, visitor_id) = seed_request(&db).await;
        let stranger = seed_user(&db, "stranger@example.com", Role::Visitor).await;

        let hidden = cancel_request(db.pool(), request_id, stranger.user_id).await;
        assert!(matches!(hidden, Err(DatabaseError::NotFound { .. })));

        let cancelled = cancel_request(db.pool(), request_id, visitor_id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);

        let again = cancel_request(db.pool(), request_id, visitor_id).await;
        assert!(matches!(
            again,
            Err(DatabaseError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn guide_listing_includes_unassigned_actionable_requests() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;
        let guide = seed_user(&db, "guide@example.com", Role::Guide).await;

        // Pending and unassigned: not guide-actionable yet.
        let before = list_requests_for_guide(db.pool(), guide.user_id)
            .await
            .unwrap();
        assert!(before.is_empty());

        confirm_payment_for(&db, request_id).await;
        approve_request(db.pool(), request_id).await.unwrap();

        let after = list_requests_for_guide(db.pool(), guide.user_id)
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].amount, Some(200.0));
    }

    #[tokio::test]
    async fn delete_request_cascades() {
        let db = test_db().await;
        let (request_id, _) = seed_request(&db).await;
        confirm_payment_for(&db, request_id).await;

        delete_request(db.pool(), request_id).await.unwrap();

        assert!(matches!(
            get_request(db.pool(), request_id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(payment::list_payments(db.pool()).await.unwrap().is_empty());

        let missing = delete_request(db.pool(), request_id).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }
}
