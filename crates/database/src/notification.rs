//! Notification CRUD operations.
//!
//! Delivery policy (best-effort, never failing the primary operation)
//! lives in the API layer; these are the raw persistence calls.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewNotification, Notification};
use crate::user;

const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, title, message, \
                                    notification_type, related_request_id, \
                                    related_payment_id, is_read, created_at";

/// Insert a notification for one user. Returns the generated id.
pub async fn create(pool: &SqlitePool, user_id: i64, note: &NewNotification) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, title, message, notification_type,
                                   related_request_id, related_payment_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&note.title)
    .bind(&note.message)
    .bind(&note.notification_type)
    .bind(note.related_request_id)
    .bind(note.related_payment_id)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Insert one notification per admin user.
pub async fn notify_admins(pool: &SqlitePool, note: &NewNotification) -> Result<()> {
    let admins = user::admin_ids(pool).await?;
    for admin_id in admins {
        create(pool, admin_id, note).await?;
    }
    Ok(())
}

/// A user's notifications, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(&format!(
        r#"
        SELECT {NOTIFICATION_COLUMNS}
        FROM notifications
        WHERE user_id = ?
        ORDER BY created_at DESC, notification_id DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

/// Mark one of the user's notifications read.
pub async fn mark_read(pool: &SqlitePool, id: i64, user_id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = 1
        WHERE notification_id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Notification",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a notification, but only if it belongs to the requesting user.
pub async fn delete(pool: &SqlitePool, id: i64, user_id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE notification_id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Notification",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Role;
    use crate::test_support::{seed_user, test_db};

    fn note(title: &str) -> NewNotification {
        NewNotification {
            title: title.to_string(),
            message: "message".to_string(),
            notification_type: "system".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fan_out_reaches_every_admin() {
        let db = test_db().await;
        let a1 = seed_user(&db, "a1@example.com", Role::Admin).await;
        let a2 = seed_user(&db, "a2@example.com", Role::Admin).await;
        let visitor = seed_user(&db, "v@example.com", Role::Visitor).await;

        notify_admins(db.pool(), &note("New Site Submitted"))
            .await
            .unwrap();

        assert_eq!(list_for_user(db.pool(), a1.user_id).await.unwrap().len(), 1);
        assert_eq!(list_for_user(db.pool(), a2.user_id).await.unwrap().len(), 1);
        assert!(list_for_user(db.pool(), visitor.user_id)
            .await
            .unwrap()
            .is_empty());

        // Each call fans out again; there is no dedup.
        notify_admins(db.pool(), &note("New Site Submitted"))
            .await
            .unwrap();
        assert_eq!(list_for_user(db.pool(), a1.user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_checks_ownership() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Visitor).await;
        let other = seed_user(&db, "other@example.com", Role::Visitor).await;

        let id = create(db.pool(), owner.user_id, &note("Hello")).await.unwrap();

        let denied = delete(db.pool(), id, other.user_id).await;
        assert!(matches!(denied, Err(DatabaseError::NotFound { .. })));

        delete(db.pool(), id, owner.user_id).await.unwrap();
        assert!(list_for_user(db.pool(), owner.user_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn mark_read_flips_flag() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Visitor).await;
        let id = create(db.pool(), owner.user_id, &note("Unread")).await.unwrap();

        mark_read(db.pool(), id, owner.user_id).await.unwrap();
        let notes = list_for_user(db.pool(), owner.user_id).await.unwrap();
        assert!(notes[0].is_read);
    }
}
