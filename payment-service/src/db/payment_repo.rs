/// Payment repository - database operations for charges
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Payment, PaymentProvider, PaymentStatus};

const PAYMENT_COLUMNS: &str = "id, payer_email, provider, provider_payment_id, amount_cents, \
     currency, status, qr_code, qr_code_base64, visitor_id, paid_at, expires_at, \
     created_at, updated_at";

pub struct NewPayment<'a> {
    pub payer_email: &'a str,
    pub provider: PaymentProvider,
    pub provider_payment_id: &'a str,
    pub amount_cents: i64,
    pub currency: &'a str,
    pub qr_code: Option<&'a str>,
    pub qr_code_base64: Option<&'a str>,
    pub visitor_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub async fn insert_payment(pool: &PgPool, new: NewPayment<'_>) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payments (id, payer_email, provider, provider_payment_id, amount_cents, \
         currency, status, qr_code, qr_code_base64, visitor_id, paid_at, expires_at, \
         created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9, NULL, $10, NOW(), NOW()) \
         RETURNING {PAYMENT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(new.payer_email)
    .bind(new.provider.as_str())
    .bind(new.provider_payment_id)
    .bind(new.amount_cents)
    .bind(new.currency)
    .bind(new.qr_code)
    .bind(new.qr_code_base64)
    .bind(new.visitor_id)
    .bind(new.expires_at)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(payment)
}

pub async fn get_payment(pool: &PgPool, payment_id: Uuid) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
    ))
    .bind(payment_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Payment not found".to_string()))
}

pub async fn find_by_provider_payment_id(
    pool: &PgPool,
    provider: PaymentProvider,
    provider_payment_id: &str,
) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments \
         WHERE provider = $1 AND provider_payment_id = $2"
    ))
    .bind(provider.as_str())
    .bind(provider_payment_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(payment)
}

/// Transition a charge to `paid`, exactly once.
///
/// Returns the updated row only when this call performed the transition;
/// `None` means another observer (watcher, manual check, Stripe return)
/// got there first. Confirmation side effects key off this.
pub async fn mark_paid(pool: &PgPool, payment_id: Uuid) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "UPDATE payments SET status = 'paid', paid_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND status <> 'paid' \
         RETURNING {PAYMENT_COLUMNS}"
    ))
    .bind(payment_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(payment)
}

/// Record a non-paid terminal status observed at the provider.
///
/// Paid rows are never downgraded.
pub async fn mark_status(pool: &PgPool, payment_id: Uuid, status: PaymentStatus) -> Result<()> {
    sqlx::query(
        "UPDATE payments SET status = $2, updated_at = NOW() \
         WHERE id = $1 AND status NOT IN ('paid', $2)",
    )
    .bind(payment_id)
    .bind(status.as_str())
    .execute(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(())
}
