//! Site image rows. Each site has at most one primary image, kept in
//! sync with the site's own `image_url` column by the callers.

use sqlx::SqlitePool;

use crate::error::Result;

/// Insert a primary image row for a site.
pub async fn insert_primary(
    pool: &SqlitePool,
    site_id: i64,
    image_url: &str,
    uploaded_by: Option<i64>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO site_images (site_id, image_url, is_primary, uploaded_by)
        VALUES (?, ?, 1, ?)
        "#,
    )
    .bind(site_id)
    .bind(image_url)
    .bind(uploaded_by)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Update the primary image if one exists, otherwise insert it.
pub async fn set_primary(
    pool: &SqlitePool,
    site_id: i64,
    image_url: &str,
    uploaded_by: Option<i64>,
) -> Result<()> {
    let existing = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT image_id FROM site_images
        WHERE site_id = ? AND is_primary = 1
        LIMIT 1
        "#,
    )
    .bind(site_id)
    .fetch_optional(pool)
    .await?;

    match existing {
        Some(image_id) => {
            sqlx::query(
                r#"
                UPDATE site_images
                SET image_url = ?, uploaded_by = ?
                WHERE image_id = ?
                "#,
            )
            .bind(image_url)
            .bind(uploaded_by)
            .bind(image_id)
            .execute(pool)
            .await?;
        }
        None => {
            insert_primary(pool, site_id, image_url, uploaded_by).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{create_site, NewSite};
    use crate::status::Role;
    use crate::test_support::{seed_user, test_db};

    #[tokio::test]
    async fn set_primary_updates_in_place() {
        let db = test_db().await;
        let researcher = seed_user(&db, "r@example.com", Role::Researcher).await;
        let site = NewSite {
            site_name: "Lalibela".to_string(),
            ..Default::default()
        };
        let site_id = create_site(db.pool(), Some(researcher.user_id), &site)
            .await
            .unwrap();

        set_primary(db.pool(), site_id, "https://img/one.jpg", Some(researcher.user_id))
            .await
            .unwrap();
        set_primary(db.pool(), site_id, "https://img/two.jpg", Some(researcher.user_id))
            .await
            .unwrap();

        let rows = sqlx::query_as::<_, (String, bool)>(
            "SELECT image_url, is_primary FROM site_images WHERE site_id = ?",
        )
        .bind(site_id)
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(rows, vec![("https://img/two.jpg".to_string(), true)]);
    }
}
