//! Researcher activity log.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ResearcherActivity;

/// Record a researcher activity (best-effort callers swallow failures).
pub async fn log_activity(
    pool: &SqlitePool,
    researcher_id: Option<i64>,
    activity_type: &str,
    description: &str,
    related_site_id: Option<i64>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO researcher_activities (researcher_id, activity_type, description, related_site_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(researcher_id)
    .bind(activity_type)
    .bind(description)
    .bind(related_site_id)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Activities for one researcher, newest first.
pub async fn list_for_researcher(
    pool: &SqlitePool,
    researcher_id: i64,
) -> Result<Vec<ResearcherActivity>> {
    let rows = sqlx::query_as::<_, ResearcherActivity>(
        r#"
        SELECT activity_id, researcher_id, activity_type, description,
               related_site_id, created_at
        FROM researcher_activities
        WHERE researcher_id = ?
        ORDER BY created_at DESC, activity_id DESC
        "#,
    )
    .bind(researcher_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Role;
    use crate::test_support::{seed_user, test_db};

    #[tokio::test]
    async fn log_and_list() {
        let db = test_db().await;
        let researcher = seed_user(&db, "r@example.com", Role::Researcher).await;

        log_activity(
            db.pool(),
            Some(researcher.user_id),
            "add_site",
            "Added new site: Lalibela",
            Some(1),
        )
        .await
        .unwrap();

        let rows = list_for_researcher(db.pool(), researcher.user_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activity_type, "add_site");
    }
}
