//! Visit reports filed by guides.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Report, ReportListing};

/// Insert a report for a request. The acting guide must be the one
/// assigned to the request. Returns the generated id.
pub async fn create_report(
    pool: &SqlitePool,
    guide_id: i64,
    request_id: i64,
    report_text: &str,
    report_date: &str,
) -> Result<i64> {
    let assigned = sqlx::query_scalar::<_, Option<i64>>(
        r#"
        SELECT assigned_guide_id FROM guide_requests WHERE request_id = ?
        "#,
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    match assigned {
        Some(Some(id)) if id == guide_id => {}
        Some(_) => {
            return Err(DatabaseError::NotAssignedGuide {
                request_id,
                guide_id,
            })
        }
        None => {
            return Err(DatabaseError::NotFound {
                entity: "GuideRequest",
                id: request_id.to_string(),
            })
        }
    }

    let result = sqlx::query(
        r#"
        INSERT INTO reports (request_id, guide_id, report_text, report_date)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(request_id)
    .bind(guide_id)
    .bind(report_text)
    .bind(report_date)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All reports joined with guide name and site name, newest first.
pub async fn list_reports(pool: &SqlitePool) -> Result<Vec<ReportListing>> {
    let reports = sqlx::query_as::<_, ReportListing>(
        r#"
        SELECT rep.report_id, rep.request_id, rep.guide_id, rep.report_text,
               rep.report_date, rep.created_at,
               g.first_name || ' ' || g.last_name AS guide_name,
               s.site_name AS site_name
        FROM reports rep
        INNER JOIN users g ON g.user_id = rep.guide_id
        INNER JOIN guide_requests r ON r.request_id = rep.request_id
        LEFT JOIN sites s ON s.site_id = r.site_id
        ORDER BY rep.created_at DESC, rep.report_id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// Reports filed by one guide.
pub async fn list_reports_for_guide(pool: &SqlitePool, guide_id: i64) -> Result<Vec<Report>> {
    let reports = sqlx::query_as::<_, Report>(
        r#"
        SELECT report_id, request_id, guide_id, report_text, report_date, created_at
        FROM reports
        WHERE guide_id = ?
        ORDER BY created_at DESC, report_id DESC
        "#,
    )
    .bind(guide_id)
    .fetch_all(pool)
    .await?;

    Ok(reports)
}
