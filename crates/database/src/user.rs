//! User CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "user_id, first_name, last_name, email, password_hash, \
                            role, is_active, must_change_password, created_at";

/// Profile fields an account holder (or admin) may change.
///
/// `None` means no change; password changes go through `password_hash`.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Create a new user. Returns the generated id.
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (first_name, last_name, email, password_hash, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: user.email.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by email (login lookup).
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.to_string(),
    })
}

/// List all users, newest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, user_id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Activate or deactivate an account.
pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_active = ?
        WHERE user_id = ?
        "#,
    )
    .bind(active)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Apply profile changes. A password change also clears the
/// first-login password-change flag.
pub async fn update_profile(pool: &SqlitePool, id: i64, changes: &ProfileChanges) -> Result<()> {
    let mut sets = Vec::new();
    if changes.first_name.is_some() {
        sets.push("first_name = ?");
    }
    if changes.last_name.is_some() {
        sets.push("last_name = ?");
    }
    if changes.email.is_some() {
        sets.push("email = ?");
    }
    if changes.password_hash.is_some() {
        sets.push("password_hash = ?");
        sets.push("must_change_password = 0");
    }

    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!("UPDATE users SET {} WHERE user_id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    if let Some(v) = &changes.first_name {
        query = query.bind(v);
    }
    if let Some(v) = &changes.last_name {
        query = query.bind(v);
    }
    if let Some(v) = &changes.email {
        query = query.bind(v);
    }
    if let Some(v) = &changes.password_hash {
        query = query.bind(v);
    }
    let result = query.bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a user by ID.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// All user ids with the admin role (notification fan-out targets).
pub async fn admin_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT user_id FROM users WHERE role = 'admin'
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Role;
    use crate::test_support::{seed_user, test_db};

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = test_db().await;
        seed_user(&db, "dup@example.com", Role::Visitor).await;

        let again = NewUser {
            first_name: "Other".to_string(),
            last_name: "User".to_string(),
            email: "dup@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Guide,
        };
        let result = create_user(db.pool(), &again).await;
        assert!(matches!(
            result,
            Err(DatabaseError::AlreadyExists { entity: "User", .. })
        ));
    }

    #[tokio::test]
    async fn toggle_active_flag() {
        let db = test_db().await;
        let user = seed_user(&db, "g@example.com", Role::Guide).await;

        set_active(db.pool(), user.user_id, false).await.unwrap();
        let fetched = get_user(db.pool(), user.user_id).await.unwrap();
        assert!(!fetched.is_active);

        let missing = set_active(db.pool(), 9999, true).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn password_change_clears_first_login_flag() {
        let db = test_db().await;
        let user = seed_user(&db, "p@example.com", Role::Admin).await;
        sqlx::query("UPDATE users SET must_change_password = 1 WHERE user_id = ?")
            .bind(user.user_id)
            .execute(db.pool())
            .await
            .unwrap();

        let changes = ProfileChanges {
            password_hash: Some("new-hash".to_string()),
            ..Default::default()
        };
        update_profile(db.pool(), user.user_id, &changes)
            .await
            .unwrap();

        let fetched = get_user(db.pool(), user.user_id).await.unwrap();
        assert_eq!(fetched.password_hash, "new-hash");
        assert!(!fetched.must_change_password);
    }

    #[tokio::test]
    async fn admin_ids_only_returns_admins() {
        let db = test_db().await;
        let admin = seed_user(&db, "a1@example.com", Role::Admin).await;
        seed_user(&db, "v@example.com", Role::Visitor).await;
        let admin2 = seed_user(&db, "a2@example.com", Role::Admin).await;

        let mut ids = admin_ids(db.pool()).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec![admin.user_id, admin2.user_id]);
    }
}
