//! Category and Region lookup dimensions.
//!
//! Names are unique at the storage layer, so find-or-create is a
//! conflict-tolerant insert followed by a select rather than a
//! read-then-write pair. Two concurrent calls with the same name
//! converge on one row.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};

/// Resolve a category name to its id, creating the row if absent.
pub async fn ensure_category(pool: &SqlitePool, name: &str) -> Result<i64> {
    ensure(pool, "categories", "category_id", "category_name", name).await
}

/// Resolve a region name to its id, creating the row if absent.
pub async fn ensure_region(pool: &SqlitePool, name: &str) -> Result<i64> {
    ensure(pool, "regions", "region_id", "region_name", name).await
}

async fn ensure(
    pool: &SqlitePool,
    table: &str,
    id_col: &str,
    name_col: &str,
    name: &str,
) -> Result<i64> {
    let name = name.trim();

    sqlx::query(&format!(
        "INSERT INTO {table} ({name_col}) VALUES (?) ON CONFLICT({name_col}) DO NOTHING"
    ))
    .bind(name)
    .execute(pool)
    .await?;

    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT {id_col} FROM {table} WHERE {name_col} = ?"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Lookup",
        id: name.to_string(),
    })
}

/// List all category names with ids.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT category_id, category_name
        FROM categories
        ORDER BY category_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List all region names with ids.
pub async fn list_regions(pool: &SqlitePool) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT region_id, region_name
        FROM regions
        ORDER BY region_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let db = test_db().await;

        let first = ensure_category(db.pool(), "Historical").await.unwrap();
        let second = ensure_category(db.pool(), "Historical").await.unwrap();
        assert_eq!(first, second);

        let trimmed = ensure_category(db.pool(), "  Historical  ").await.unwrap();
        assert_eq!(first, trimmed);

        let cats = list_categories(db.pool()).await.unwrap();
        assert_eq!(cats.len(), 1);
    }

    #[tokio::test]
    async fn regions_and_categories_are_separate() {
        let db = test_db().await;

        let cat = ensure_category(db.pool(), "Amhara").await.unwrap();
        let reg = ensure_region(db.pool(), "Amhara").await.unwrap();

        assert_eq!(list_categories(db.pool()).await.unwrap().len(), 1);
        assert_eq!(list_regions(db.pool()).await.unwrap().len(), 1);
        // Same name in both tables stays independent.
        let _ = (cat, reg);
    }
}
