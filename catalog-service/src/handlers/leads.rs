/// Lead capture handlers - marketing email list
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CaptureLeadRequest, Lead};
use crate::validators::validate_email;

/// Capture a marketing email. Validation runs before any write; resubmitting
/// the same address is a no-op that still returns the stored lead.
pub async fn capture_lead(
    pool: web::Data<PgPool>,
    req: web::Json<CaptureLeadRequest>,
) -> Result<HttpResponse> {
    let email = req.email.trim().to_lowercase();
    if !validate_email(&email) {
        return Err(AppError::InvalidEmail(req.email.clone()));
    }

    let lead = sqlx::query_as::<_, Lead>(
        "INSERT INTO leads (id, email, source, created_at) \
         VALUES ($1, $2, $3, NOW()) \
         ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email \
         RETURNING id, email, source, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&req.source)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Created().json(lead))
}

/// Admin: list captured leads, newest first
pub async fn list_leads(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let leads = sqlx::query_as::<_, Lead>(
        "SELECT id, email, source, created_at FROM leads ORDER BY created_at DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(leads))
}

#[cfg(test)]
mod tests {
    use super::*;

    // A lazy pool never opens a connection unless a query runs, so a
    // rejection here proves validation happened before any write.
    #[tokio::test]
    async fn invalid_email_rejected_before_any_write() {
        let pool = web::Data::new(
            PgPool::connect_lazy("postgresql://localhost/scarlet_test").expect("lazy pool"),
        );
        let req = web::Json(CaptureLeadRequest {
            email: "not-an-email".to_string(),
            source: Some("footer".to_string()),
        });

        let result = capture_lead(pool, req).await;
        assert!(matches!(result, Err(AppError::InvalidEmail(_))));
    }
}
