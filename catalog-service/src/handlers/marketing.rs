/// Marketing blast handler
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::services::Mailer;

#[derive(Debug, Deserialize)]
pub struct BlastRequest {
    pub subject: String,
    pub html_body: String,
}

/// Admin: send a campaign email to every captured lead
pub async fn send_blast(
    pool: web::Data<PgPool>,
    mailer: web::Data<Option<Mailer>>,
    req: web::Json<BlastRequest>,
) -> Result<HttpResponse> {
    let mailer = mailer
        .as_ref()
        .as_ref()
        .ok_or_else(|| AppError::Internal("SMTP is not configured".to_string()))?;

    if req.subject.trim().is_empty() {
        return Err(AppError::BadRequest("Subject is required".to_string()));
    }

    let recipients: Vec<String> = sqlx::query_scalar("SELECT email FROM leads ORDER BY created_at")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if recipients.is_empty() {
        return Err(AppError::BadRequest("No leads to send to".to_string()));
    }

    let summary = mailer
        .send_campaign(&recipients, req.subject.trim(), &req.html_body)
        .await;

    Ok(HttpResponse::Ok().json(summary))
}
