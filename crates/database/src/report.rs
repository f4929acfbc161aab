//! Report storage.
//!
//! Reports are append-only: there is no update or delete here.

use outbreak_core::{GeoPoint, Report, ReportId};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::ReportRow;

/// Append a report and return it with its assigned id and timestamp.
pub async fn insert_report(
    pool: &SqlitePool,
    reporter_id: &str,
    location: GeoPoint,
    symptom: &str,
) -> Result<Report> {
    let row = sqlx::query_as::<_, ReportRow>(
        r#"
        INSERT INTO reports (reporter_id, longitude, latitude, symptom)
        VALUES (?, ?, ?, ?)
        RETURNING id, reporter_id, longitude, latitude, symptom, created_at
        "#,
    )
    .bind(reporter_id)
    .bind(location.longitude())
    .bind(location.latitude())
    .bind(symptom)
    .fetch_one(pool)
    .await?;

    Report::try_from(row)
}

/// Get a report by ID.
pub async fn get_report(pool: &SqlitePool, id: ReportId) -> Result<Report> {
    let row = sqlx::query_as::<_, ReportRow>(
        r#"
        SELECT id, reporter_id, longitude, latitude, symptom, created_at
        FROM reports
        WHERE id = ?
        "#,
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Report",
        id: id.to_string(),
    })?;

    Report::try_from(row)
}

/// List reports newest first.
///
/// A `None` limit returns every report.
pub async fn list_reports(pool: &SqlitePool, limit: Option<u32>) -> Result<Vec<Report>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map(i64::from).unwrap_or(-1);

    let rows = sqlx::query_as::<_, ReportRow>(
        r#"
        SELECT id, reporter_id, longitude, latitude, symptom, created_at
        FROM reports
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Report::try_from).collect()
}

/// Count total reports.
pub async fn count_reports(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reports
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
