/// Tracking repository - attribution visits and CPA conversions
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Conversion, TrackVisitRequest, Visit};

/// Store first-touch attribution. Repeat loads with the same visitor keep
/// the original row (first touch wins).
pub async fn insert_visit(pool: &PgPool, req: &TrackVisitRequest) -> Result<Visit> {
    let visit = sqlx::query_as::<_, Visit>(
        "INSERT INTO visits (id, visitor_id, source, campaign, utm_source, utm_medium, \
         utm_campaign, utm_term, utm_content, landing_path, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) \
         ON CONFLICT (visitor_id) DO UPDATE SET visitor_id = EXCLUDED.visitor_id \
         RETURNING id, visitor_id, source, campaign, utm_source, utm_medium, \
         utm_campaign, utm_term, utm_content, landing_path, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(req.visitor_id)
    .bind(&req.source)
    .bind(&req.campaign)
    .bind(&req.utm_source)
    .bind(&req.utm_medium)
    .bind(&req.utm_campaign)
    .bind(&req.utm_term)
    .bind(&req.utm_content)
    .bind(&req.landing_path)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(visit)
}

pub async fn find_visit_by_visitor(pool: &PgPool, visitor_id: Uuid) -> Result<Option<Visit>> {
    let visit = sqlx::query_as::<_, Visit>(
        "SELECT id, visitor_id, source, campaign, utm_source, utm_medium, \
         utm_campaign, utm_term, utm_content, landing_path, created_at \
         FROM visits WHERE visitor_id = $1",
    )
    .bind(visitor_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(visit)
}

pub async fn insert_conversion(
    pool: &PgPool,
    payment_id: Uuid,
    visit: Option<&Visit>,
    amount_cents: i64,
) -> Result<Conversion> {
    let conversion = sqlx::query_as::<_, Conversion>(
        "INSERT INTO conversions (id, payment_id, visit_id, source, campaign, amount_cents, \
         cpa_notified, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, FALSE, NOW()) \
         RETURNING id, payment_id, visit_id, source, campaign, amount_cents, \
         cpa_notified, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(payment_id)
    .bind(visit.map(|v| v.id))
    .bind(visit.and_then(|v| v.source.clone()))
    .bind(visit.and_then(|v| v.campaign.clone()))
    .bind(amount_cents)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(conversion)
}

pub async fn mark_cpa_notified(pool: &PgPool, conversion_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE conversions SET cpa_notified = TRUE WHERE id = $1")
        .bind(conversion_id)
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(())
}

pub async fn list_conversions(pool: &PgPool, limit: i64) -> Result<Vec<Conversion>> {
    let conversions = sqlx::query_as::<_, Conversion>(
        "SELECT id, payment_id, visit_id, source, campaign, amount_cents, \
         cpa_notified, created_at \
         FROM conversions ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(conversions)
}
