/// Count reconciliation for the admin sync tools
///
/// The browse pages read denormalized `video_count` columns; manual edits
/// and out-of-band imports let them drift from the live counts. The report
/// lists drifted rows, the repair rewrites the stored counts. Repair is
/// idempotent: a second run finds nothing to change.
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CountRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub stored_count: i32,
    pub live_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub entity: &'static str,
    pub total: usize,
    pub drifted: Vec<CountRow>,
}

pub async fn category_report(pool: &PgPool) -> Result<SyncReport> {
    let rows = sqlx::query_as::<_, CountRow>(
        "SELECT c.id, c.name, c.video_count AS stored_count, COUNT(v.id) AS live_count \
         FROM categories c \
         LEFT JOIN videos v ON v.category_id = c.id \
         AND v.deleted_at IS NULL AND v.status = 'published' \
         GROUP BY c.id, c.name, c.video_count \
         ORDER BY c.name",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(build_report("categories", rows))
}

pub async fn creator_report(pool: &PgPool) -> Result<SyncReport> {
    let rows = sqlx::query_as::<_, CountRow>(
        "SELECT c.id, c.name, c.video_count AS stored_count, COUNT(v.id) AS live_count \
         FROM creators c \
         LEFT JOIN videos v ON v.creator_id = c.id \
         AND v.deleted_at IS NULL AND v.status = 'published' \
         GROUP BY c.id, c.name, c.video_count \
         ORDER BY c.name",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(build_report("creators", rows))
}

/// Rewrite stored category counts from the live counts. Returns how many
/// rows changed.
pub async fn repair_categories(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE categories c SET video_count = live.count, updated_at = NOW() \
         FROM (SELECT c2.id, COUNT(v.id) AS count \
               FROM categories c2 \
               LEFT JOIN videos v ON v.category_id = c2.id \
               AND v.deleted_at IS NULL AND v.status = 'published' \
               GROUP BY c2.id) live \
         WHERE live.id = c.id AND c.video_count <> live.count",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected())
}

/// Rewrite stored creator counts from the live counts
pub async fn repair_creators(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE creators c SET video_count = live.count, updated_at = NOW() \
         FROM (SELECT c2.id, COUNT(v.id) AS count \
               FROM creators c2 \
               LEFT JOIN videos v ON v.creator_id = c2.id \
               AND v.deleted_at IS NULL AND v.status = 'published' \
               GROUP BY c2.id) live \
         WHERE live.id = c.id AND c.video_count <> live.count",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected())
}

fn build_report(entity: &'static str, rows: Vec<CountRow>) -> SyncReport {
    let total = rows.len();
    let drifted = rows
        .into_iter()
        .filter(|row| i64::from(row.stored_count) != row.live_count)
        .collect();

    SyncReport {
        entity,
        total,
        drifted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(stored: i32, live: i64) -> CountRow {
        CountRow {
            id: Uuid::new_v4(),
            name: "amateur".to_string(),
            stored_count: stored,
            live_count: live,
        }
    }

    #[test]
    fn test_report_flags_only_drifted_rows() {
        let report = build_report("categories", vec![row(3, 3), row(5, 2), row(0, 1)]);
        assert_eq!(report.total, 3);
        assert_eq!(report.drifted.len(), 2);
        assert!(report.drifted.iter().all(|r| i64::from(r.stored_count) != r.live_count));
    }

    #[test]
    fn test_report_clean_when_counts_match() {
        let report = build_report("creators", vec![row(2, 2), row(0, 0)]);
        assert!(report.drifted.is_empty());
    }
}
