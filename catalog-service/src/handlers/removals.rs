/// Content-removal request handlers
///
/// Submission is public (anyone can report a video), listing and status
/// changes are admin operations.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreateRemovalRequest, RemovalRequest, RemovalStatus, UpdateRemovalRequest};
use crate::validators::validate_email;

const REMOVAL_COLUMNS: &str = "id, video_url, reporter_email, reason, status, created_at, updated_at";

/// Public: submit a removal request
pub async fn create_removal_request(
    pool: web::Data<PgPool>,
    req: web::Json<CreateRemovalRequest>,
) -> Result<HttpResponse> {
    if req.video_url.trim().is_empty() {
        return Err(AppError::BadRequest("Video URL is required".to_string()));
    }
    if req.reason.trim().is_empty() {
        return Err(AppError::BadRequest("Reason is required".to_string()));
    }
    if !validate_email(&req.reporter_email) {
        return Err(AppError::InvalidEmail(req.reporter_email.clone()));
    }

    let removal = sqlx::query_as::<_, RemovalRequest>(&format!(
        "INSERT INTO removal_requests (id, video_url, reporter_email, reason, status, \
         created_at, updated_at) \
         VALUES ($1, $2, $3, $4, 'pending', NOW(), NOW()) \
         RETURNING {}",
        REMOVAL_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(req.video_url.trim())
    .bind(&req.reporter_email)
    .bind(req.reason.trim())
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    tracing::info!(request_id = %removal.id, "Removal request submitted");
    Ok(HttpResponse::Created().json(removal))
}

#[derive(Debug, Deserialize)]
pub struct ListRemovalsQuery {
    pub status: Option<String>,
}

/// Admin: list removal requests, optionally filtered by status
pub async fn list_removal_requests(
    pool: web::Data<PgPool>,
    query: web::Query<ListRemovalsQuery>,
) -> Result<HttpResponse> {
    if let Some(status) = query.status.as_deref() {
        if RemovalStatus::from_str(status).is_none() {
            return Err(AppError::BadRequest(format!("Invalid status: {}", status)));
        }
    }

    let removals = sqlx::query_as::<_, RemovalRequest>(&format!(
        "SELECT {} FROM removal_requests \
         WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC",
        REMOVAL_COLUMNS
    ))
    .bind(&query.status)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(removals))
}

/// Admin: move a request through the review workflow
pub async fn update_removal_request(
    pool: web::Data<PgPool>,
    request_id: web::Path<String>,
    req: web::Json<UpdateRemovalRequest>,
) -> Result<HttpResponse> {
    let request_uuid = Uuid::parse_str(&request_id)
        .map_err(|_| AppError::BadRequest("Invalid request ID".to_string()))?;

    let status = RemovalStatus::from_str(&req.status)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid status: {}", req.status)))?;

    let removal = sqlx::query_as::<_, RemovalRequest>(&format!(
        "UPDATE removal_requests SET status = $2, updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        REMOVAL_COLUMNS
    ))
    .bind(request_uuid)
    .bind(status.as_str())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Removal request not found".to_string()))?;

    tracing::info!(request_id = %removal.id, status = %removal.status, "Removal request updated");
    Ok(HttpResponse::Ok().json(removal))
}
