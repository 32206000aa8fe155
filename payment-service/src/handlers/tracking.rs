/// Campaign attribution handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::context::AppContext;
use crate::db::tracking_repo;
use crate::error::Result;
use crate::models::{ConversionResponse, TrackVisitRequest};

/// Store first-touch attribution POSTed by the landing page
pub async fn track_visit(
    ctx: web::Data<AppContext>,
    req: web::Json<TrackVisitRequest>,
) -> Result<HttpResponse> {
    let visit = tracking_repo::insert_visit(&ctx.pool, &req).await?;

    tracing::info!(
        visitor_id = %visit.visitor_id,
        source = visit.source.as_deref().unwrap_or("-"),
        campaign = visit.campaign.as_deref().unwrap_or("-"),
        "Visit tracked"
    );

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": visit.id })))
}

#[derive(Debug, Deserialize)]
pub struct ConversionListQuery {
    pub limit: Option<i64>,
}

/// Conversion listing for ad-spend accounting
pub async fn list_conversions(
    ctx: web::Data<AppContext>,
    query: web::Query<ConversionListQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let conversions = tracking_repo::list_conversions(&ctx.pool, limit).await?;

    let responses: Vec<ConversionResponse> =
        conversions.into_iter().map(|c| c.into()).collect();
    Ok(HttpResponse::Ok().json(responses))
}
