/// PIX charge handlers
use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::context::AppContext;
use crate::db::payment_repo::{self, NewPayment};
use crate::error::{AppError, Result};
use crate::models::{
    CreatePixRequest, PaymentProvider, PaymentStatusResponse, PixChargeResponse,
};
use crate::providers::PixCharge;
use crate::services::watcher;

/// Visual countdown shown next to the QR code. Display only; the watcher's
/// polling ceiling is independent of it.
const DISPLAY_COUNTDOWN_MINUTES: i64 = 15;

/// Create a PIX charge. Mercado Pago first, Efí as fallback.
pub async fn create_pix_charge(
    ctx: web::Data<AppContext>,
    req: web::Json<CreatePixRequest>,
) -> Result<HttpResponse> {
    if req.amount_cents <= 0 {
        return Err(AppError::ValidationError("Amount must be positive".to_string()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::ValidationError("Payer email is required".to_string()));
    }

    let (charge, provider) = create_with_fallback(&ctx, req.amount_cents, &req.email).await?;

    let payment = payment_repo::insert_payment(
        &ctx.pool,
        NewPayment {
            payer_email: &req.email,
            provider,
            provider_payment_id: &charge.provider_payment_id,
            amount_cents: req.amount_cents,
            currency: "BRL",
            qr_code: Some(&charge.qr_code),
            qr_code_base64: Some(&charge.qr_code_base64),
            visitor_id: req.visitor_id,
            expires_at: Some(Utc::now() + Duration::minutes(DISPLAY_COUNTDOWN_MINUTES)),
        },
    )
    .await?;

    ctx.spawn_watch(&payment);

    tracing::info!(
        payment_id = %payment.id,
        provider = provider.as_str(),
        amount_cents = req.amount_cents,
        "PIX charge created"
    );

    Ok(HttpResponse::Created().json(PixChargeResponse::from(payment)))
}

async fn create_with_fallback(
    ctx: &AppContext,
    amount_cents: i64,
    email: &str,
) -> Result<(PixCharge, PaymentProvider)> {
    match ctx.mercadopago.create_pix_charge(amount_cents, email).await {
        Ok(charge) => Ok((charge, PaymentProvider::MercadoPago)),
        Err(e) => {
            let Some(efi) = ctx.efi.as_ref() else {
                return Err(e);
            };
            tracing::warn!(error = %e, "Mercado Pago charge failed, falling back to Efí");
            let charge = efi.create_pix_charge(amount_cents, email).await?;
            Ok((charge, PaymentProvider::Efi))
        }
    }
}

/// Charge status for UI polling. Reads our row; the watcher owns the
/// provider-side polling.
pub async fn get_payment_status(
    ctx: web::Data<AppContext>,
    payment_id: web::Path<String>,
) -> Result<HttpResponse> {
    let payment_uuid = Uuid::parse_str(&payment_id)
        .map_err(|_| AppError::BadRequest("Invalid payment ID".to_string()))?;

    let payment = payment_repo::get_payment(&ctx.pool, payment_uuid).await?;

    Ok(HttpResponse::Ok().json(PaymentStatusResponse::from(payment)))
}

/// Manual "I already paid" check: one out-of-band provider check identical
/// in shape to the polled check.
pub async fn manual_check(
    ctx: web::Data<AppContext>,
    payment_id: web::Path<String>,
) -> Result<HttpResponse> {
    let payment_uuid = Uuid::parse_str(&payment_id)
        .map_err(|_| AppError::BadRequest("Invalid payment ID".to_string()))?;

    let payment = payment_repo::get_payment(&ctx.pool, payment_uuid).await?;
    let provider = payment
        .get_provider()
        .ok_or_else(|| AppError::Internal("Unknown provider on charge".to_string()))?;
    let source = ctx
        .status_source(provider)
        .ok_or_else(|| AppError::Internal("Provider not configured".to_string()))?;

    let charge = watcher::ChargeRef {
        payment_id: payment.id,
        provider_reference: payment.provider_payment_id.clone(),
    };
    watcher::check_once(source.as_ref(), ctx.recorder.as_ref(), &charge).await?;

    let refreshed = payment_repo::get_payment(&ctx.pool, payment_uuid).await?;
    Ok(HttpResponse::Ok().json(PaymentStatusResponse::from(refreshed)))
}
