//! Payment rows for guide requests.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Payment;
use crate::status::PaymentStatus;

const PAYMENT_COLUMNS: &str =
    "payment_id, request_id, amount, currency, method, tx_ref, status, created_at";

/// Record a payment attempt. Returns the generated id.
pub async fn create_payment(
    pool: &SqlitePool,
    request_id: i64,
    amount: f64,
    currency: &str,
    method: &str,
    tx_ref: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO payments (request_id, amount, currency, method, tx_ref)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(request_id)
    .bind(amount)
    .bind(currency)
    .bind(method)
    .bind(tx_ref)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Payment",
                    id: tx_ref.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Get a payment by ID.
pub async fn get_payment(pool: &SqlitePool, id: i64) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE payment_id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Payment",
        id: id.to_string(),
    })
}

/// Get a payment by its gateway transaction reference.
pub async fn get_by_tx_ref(pool: &SqlitePool, tx_ref: &str) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE tx_ref = ?"
    ))
    .bind(tx_ref)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Payment",
        id: tx_ref.to_string(),
    })
}

/// Set a payment's status by ID.
pub async fn set_status(pool: &SqlitePool, id: i64, status: PaymentStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET status = ?
        WHERE payment_id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Payment",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Set a payment's status by transaction reference, returning the
/// updated row (gateway verification reconciliation).
pub async fn set_status_by_tx_ref(
    pool: &SqlitePool,
    tx_ref: &str,
    status: PaymentStatus,
) -> Result<Payment> {
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET status = ?
        WHERE tx_ref = ?
        "#,
    )
    .bind(status)
    .bind(tx_ref)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Payment",
            id: tx_ref.to_string(),
        });
    }

    get_by_tx_ref(pool, tx_ref).await
}

/// List all payments, newest first.
pub async fn list_payments(pool: &SqlitePool) -> Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_at DESC, payment_id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

/// Payments belonging to one visitor's requests.
pub async fn list_payments_for_visitor(
    pool: &SqlitePool,
    visitor_id: i64,
) -> Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.payment_id, p.request_id, p.amount, p.currency, p.method,
               p.tx_ref, p.status, p.created_at
        FROM payments p
        INNER JOIN guide_requests r ON r.request_id = p.request_id
        WHERE r.visitor_id = ?
        ORDER BY p.created_at DESC, p.payment_id DESC
        "#,
    )
    .bind(visitor_id)
    .fetch_all(pool)
    .await?;

    Ok(payments)
}
