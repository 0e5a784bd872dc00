//! Site catalog operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Site, SiteListing};
use crate::status::SiteStatus;

const LISTING_SELECT: &str = r#"
    SELECT s.site_id, s.site_name, s.full_description, s.short_description,
           s.location_address, s.visit_price, s.estimated_duration,
           COALESCE(si.image_url, s.image_url) AS image_url,
           s.map_url, s.nearby_attractions, s.category_id, s.region_id,
           s.is_approved, s.status, s.created_by, s.created_at,
           reg.region_name AS region,
           cat.category_name AS category,
           u.first_name || ' ' || u.last_name AS researcher_name
    FROM sites s
    LEFT JOIN site_images si ON si.site_id = s.site_id AND si.is_primary = 1
    LEFT JOIN regions reg ON reg.region_id = s.region_id
    LEFT JOIN categories cat ON cat.category_id = s.category_id
    LEFT JOIN users u ON u.user_id = s.created_by
"#;

/// Fields for creating a site. Unset approval fields fall back to the
/// auto-approve defaults.
#[derive(Debug, Clone, Default)]
pub struct NewSite {
    pub site_name: String,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub location_address: Option<String>,
    pub visit_price: Option<f64>,
    pub estimated_duration: Option<String>,
    pub image_url: Option<String>,
    pub map_url: Option<String>,
    pub nearby_attractions: Option<String>,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
    pub is_approved: Option<bool>,
    pub status: Option<SiteStatus>,
}

/// Updatable site fields. `None` means no change; supplying neither
/// `is_approved` nor `status` sends the site back to pending.
#[derive(Debug, Clone, Default)]
pub struct SiteChanges {
    pub site_name: Option<String>,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub location_address: Option<String>,
    pub visit_price: Option<f64>,
    pub estimated_duration: Option<String>,
    pub image_url: Option<String>,
    pub map_url: Option<String>,
    pub nearby_attractions: Option<String>,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
    pub is_approved: Option<bool>,
    pub status: Option<SiteStatus>,
}

/// List all sites joined with primary image, lookup names, and creator
/// name, newest first.
pub async fn list_sites(pool: &SqlitePool) -> Result<Vec<SiteListing>> {
    let sites = sqlx::query_as::<_, SiteListing>(&format!(
        "{LISTING_SELECT} ORDER BY s.created_at DESC, s.site_id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(sites)
}

/// Get one site with the listing join.
pub async fn get_site(pool: &SqlitePool, id: i64) -> Result<SiteListing> {
    sqlx::query_as::<_, SiteListing>(&format!("{LISTING_SELECT} WHERE s.site_id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Site",
            id: id.to_string(),
        })
}

/// Insert a site. New submissions default to approved (current
/// behavior: researcher submissions are auto-approved).
pub async fn create_site(pool: &SqlitePool, created_by: Option<i64>, site: &NewSite) -> Result<i64> {
    let is_approved = site.is_approved.unwrap_or(true);
    let status = site.status.unwrap_or(SiteStatus::Approved);

    let result = sqlx::query(
        r#"
        INSERT INTO sites (site_name, full_description, short_description,
                           location_address, visit_price, estimated_duration,
                           image_url, map_url, nearby_attractions,
                           category_id, region_id, is_approved, status, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&site.site_name)
    .bind(&site.full_description)
    .bind(&site.short_description)
    .bind(&site.location_address)
    .bind(site.visit_price)
    .bind(&site.estimated_duration)
    .bind(&site.image_url)
    .bind(&site.map_url)
    .bind(&site.nearby_attractions)
    .bind(site.category_id)
    .bind(site.region_id)
    .bind(is_approved)
    .bind(status)
    .bind(created_by)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Apply site changes. Edits that don't carry an explicit approval
/// decision force the site back to pending for re-approval.
pub async fn update_site(pool: &SqlitePool, id: i64, changes: &SiteChanges) -> Result<()> {
    let mut sets = Vec::new();
    if changes.site_name.is_some() {
        sets.push("site_name = ?");
    }
    if changes.full_description.is_some() {
        sets.push("full_description = ?");
    }
    if changes.short_description.is_some() {
        sets.push("short_description = ?");
    }
    if changes.location_address.is_some() {
        sets.push("location_address = ?");
    }
    if changes.visit_price.is_some() {
        sets.push("visit_price = ?");
    }
    if changes.estimated_duration.is_some() {
        sets.push("estimated_duration = ?");
    }
    if changes.image_url.is_some() {
        sets.push("image_url = ?");
    }
    if changes.map_url.is_some() {
        sets.push("map_url = ?");
    }
    if changes.nearby_attractions.is_some() {
        sets.push("nearby_attractions = ?");
    }
    if changes.category_id.is_some() {
        sets.push("category_id = ?");
    }
    if changes.region_id.is_some() {
        sets.push("region_id = ?");
    }

    let reset_approval = changes.is_approved.is_none() && changes.status.is_none();
    if changes.is_approved.is_some() {
        sets.push("is_approved = ?");
    }
    if changes.status.is_some() {
        sets.push("status = ?");
    }
    if reset_approval {
        sets.push("is_approved = 0");
        sets.push("status = 'pending'");
    }

    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!("UPDATE sites SET {} WHERE site_id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    if let Some(v) = &changes.site_name {
        query = query.bind(v);
    }
    if let Some(v) = &changes.full_description {
        query = query.bind(v);
    }
    if let Some(v) = &changes.short_description {
        query = query.bind(v);
    }
    if let Some(v) = &changes.location_address {
        query = query.bind(v);
    }
    if let Some(v) = changes.visit_price {
        query = query.bind(v);
    }
    if let Some(v) = &changes.estimated_duration {
        query = query.bind(v);
    }
    if let Some(v) = &changes.image_url {
        query = query.bind(v);
    }
    if let Some(v) = &changes.map_url {
        query = query.bind(v);
    }
    if let Some(v) = &changes.nearby_attractions {
        query = query.bind(v);
    }
    if let Some(v) = changes.category_id {
        query = query.bind(v);
    }
    if let Some(v) = changes.region_id {
        query = query.bind(v);
    }
    if let Some(v) = changes.is_approved {
        query = query.bind(v);
    }
    if let Some(v) = changes.status {
        query = query.bind(v);
    }
    let result = query.bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Site",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Approve a site and return the updated row (for creator notification).
pub async fn approve_site(pool: &SqlitePool, id: i64) -> Result<Site> {
    let result = sqlx::query(
        r#"
        UPDATE sites
        SET is_approved = 1, status = 'approved'
        WHERE site_id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Site",
            id: id.to_string(),
        });
    }

    let site = sqlx::query_as::<_, Site>(
        r#"
        SELECT site_id, site_name, full_description, short_description,
               location_address, visit_price, estimated_duration, image_url,
               map_url, nearby_attractions, category_id, region_id,
               is_approved, status, created_by, created_at
        FROM sites
        WHERE site_id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(site)
}

/// Delete a site and everything hanging off it in one transaction:
/// notifications referencing the site's payments and requests, the
/// payments, visits and requests themselves, researcher activities,
/// submissions, images, and guide-type links, then the site row.
pub async fn delete_site(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE related_payment_id IN (
            SELECT payment_id FROM payments WHERE request_id IN (
                SELECT request_id FROM guide_requests WHERE site_id = ?))
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE related_request_id IN (
            SELECT request_id FROM guide_requests WHERE site_id = ?)
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM payments
        WHERE request_id IN (SELECT request_id FROM guide_requests WHERE site_id = ?)
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM visits
        WHERE request_id IN (SELECT request_id FROM guide_requests WHERE site_id = ?)
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM guide_requests WHERE site_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM researcher_activities WHERE related_site_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM site_submissions WHERE site_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM site_images WHERE site_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM site_guide_types WHERE site_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM sites WHERE site_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        // Dropping the transaction rolls everything back.
        return Err(DatabaseError::NotFound {
            entity: "Site",
            id: id.to_string(),
        });
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Role;
    use crate::test_support::{seed_user, test_db};
    use crate::{guide_request, lookup, notification, payment};
    use crate::models::NewNotification;

    #[tokio::test]
    async fn create_defaults_to_approved() {
        let db = test_db().await;
        let site = NewSite {
            site_name: "Axum Obelisks".to_string(),
            ..Default::default()
        };
        let id = create_site(db.pool(), None, &site).await.unwrap();

        let fetched = get_site(db.pool(), id).await.unwrap();
        assert!(fetched.is_approved);
        assert_eq!(fetched.status, SiteStatus::Approved);
    }

    #[tokio::test]
    async fn update_without_approval_fields_resets_to_pending() {
        let db = test_db().await;
        let id = create_site(
            db.pool(),
            None,
            &NewSite {
                site_name: "Gondar Castles".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let changes = SiteChanges {
            site_name: Some("Fasil Ghebbi".to_string()),
            ..Default::default()
        };
        update_site(db.pool(), id, &changes).await.unwrap();

        let fetched = get_site(db.pool(), id).await.unwrap();
        assert_eq!(fetched.site_name, "Fasil Ghebbi");
        assert!(!fetched.is_approved);
        assert_eq!(fetched.status, SiteStatus::Pending);
    }

    #[tokio::test]
    async fn update_with_explicit_status_keeps_it() {
        let db = test_db().await;
        let id = create_site(
            db.pool(),
            None,
            &NewSite {
                site_name: "Sof Omar Caves".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let changes = SiteChanges {
            status: Some(SiteStatus::Rejected),
            is_approved: Some(false),
            ..Default::default()
        };
        update_site(db.pool(), id, &changes).await.unwrap();

        let fetched = get_site(db.pool(), id).await.unwrap();
        assert_eq!(fetched.status, SiteStatus::Rejected);
    }

    #[tokio::test]
    async fn listing_resolves_lookup_names() {
        let db = test_db().await;
        let researcher = seed_user(&db, "res@example.com", Role::Researcher).await;
        let category_id = lookup::ensure_category(db.pool(), "Churches").await.unwrap();
        let region_id = lookup::ensure_region(db.pool(), "Amhara").await.unwrap();

        let id = create_site(
            db.pool(),
            Some(researcher.user_id),
            &NewSite {
                site_name: "Lalibela".to_string(),
                category_id: Some(category_id),
                region_id: Some(region_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let fetched = get_site(db.pool(), id).await.unwrap();
        assert_eq!(fetched.category.as_deref(), Some("Churches"));
        assert_eq!(fetched.region.as_deref(), Some("Amhara"));
        assert_eq!(fetched.researcher_name.as_deref(), Some("Test researcher"));
    }

    #[tokio::test]
    async fn approve_missing_site_is_not_found() {
        let db = test_db().await;
        let result = approve_site(db.pool(), 42).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn approve_is_idempotent_on_state() {
        let db = test_db().await;
        let id = create_site(
            db.pool(),
            None,
            &NewSite {
                site_name: "Bale Mountains".to_string(),
                status: Some(SiteStatus::Pending),
                is_approved: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let first = approve_site(db.pool(), id).await.unwrap();
        let second = approve_site(db.pool(), id).await.unwrap();
        assert_eq!(first.status, SiteStatus::Approved);
        assert_eq!(second.status, SiteStatus::Approved);
        assert!(second.is_approved);
    }

    #[tokio::test]
    async fn delete_cascades_over_requests_and_payments() {
        let db = test_db().await;
        let visitor = seed_user(&db, "v@example.com", Role::Visitor).await;
        let site_id = create_site(
            db.pool(),
            None,
            &NewSite {
                site_name: "Harar Jugol".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let request_id = guide_request::create_request(
            db.pool(),
            visitor.user_id,
            site_id,
            "2026-09-01",
            2,
            None,
        )
        .await
        .unwrap();
        let payment_id = payment::create_payment(
            db.pool(),
            request_id,
            150.0,
            "ETB",
            "chapa",
            "tourism-ref-1",
        )
        .await
        .unwrap();
        notification::create(
            db.pool(),
            visitor.user_id,
            &NewNotification {
                title: "Payment".to_string(),
                message: "recorded".to_string(),
                notification_type: "payment".to_string(),
                related_request_id: Some(request_id),
                related_payment_id: Some(payment_id),
            },
        )
        .await
        .unwrap();

        delete_site(db.pool(), site_id).await.unwrap();

        assert!(matches!(
            get_site(db.pool(), site_id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        let requests = guide_request::list_requests(db.pool()).await.unwrap();
        assert!(requests.is_empty());
        let payments = payment::list_payments(db.pool()).await.unwrap();
        assert!(payments.is_empty());
        let notes = notification::list_for_user(db.pool(), visitor.user_id)
            .await
            .unwrap();
        assert!(notes.is_empty());

        let again = delete_site(db.pool(), site_id).await;
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }
}
