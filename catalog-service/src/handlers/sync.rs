/// Admin sync handlers - denormalized count reconciliation
use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::services::sync;

#[derive(Debug, Serialize)]
struct RepairSummary {
    categories_updated: u64,
    creators_updated: u64,
}

/// Report stored-vs-live count drift for categories and creators
pub async fn sync_report(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let categories = sync::category_report(pool.get_ref()).await?;
    let creators = sync::creator_report(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "categories": categories,
        "creators": creators,
    })))
}

/// Rewrite drifted counts from the live data
pub async fn sync_repair(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let categories_updated = sync::repair_categories(pool.get_ref()).await?;
    let creators_updated = sync::repair_creators(pool.get_ref()).await?;

    tracing::info!(
        categories_updated,
        creators_updated,
        "Count repair finished"
    );

    Ok(HttpResponse::Ok().json(RepairSummary {
        categories_updated,
        creators_updated,
    }))
}
