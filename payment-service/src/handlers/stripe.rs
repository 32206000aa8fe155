/// Stripe Checkout handlers
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::Config;
use crate::context::AppContext;
use crate::db::payment_repo::{self, NewPayment};
use crate::error::{AppError, Result};
use crate::models::{
    CheckoutReturnQuery, CheckoutSessionResponse, CreateCheckoutRequest, PaymentProvider,
    PaymentStatus,
};
use crate::services::watcher;

/// Create a Checkout session for a card signup
pub async fn create_checkout(
    ctx: web::Data<AppContext>,
    config: web::Data<Config>,
    req: web::Json<CreateCheckoutRequest>,
) -> Result<HttpResponse> {
    if req.email.trim().is_empty() {
        return Err(AppError::ValidationError("Customer email is required".to_string()));
    }

    let session = ctx.stripe.create_checkout_session(&req.email).await?;

    // No watcher for card checkouts: confirmation happens on the return
    // redirect, once Stripe reports the session paid.
    payment_repo::insert_payment(
        &ctx.pool,
        NewPayment {
            payer_email: &req.email,
            provider: PaymentProvider::Stripe,
            provider_payment_id: &session.session_id,
            amount_cents: config.stripe.premium_price_cents,
            currency: "BRL",
            qr_code: None,
            qr_code_base64: None,
            visitor_id: req.visitor_id,
            expires_at: None,
        },
    )
    .await?;

    tracing::info!(session_id = %session.session_id, "Checkout session created");

    Ok(HttpResponse::Created().json(CheckoutSessionResponse {
        checkout_url: session.checkout_url,
        session_id: session.session_id,
    }))
}

/// Stripe return redirect: `?success=true&session_id=...` or `?canceled=true`
pub async fn checkout_return(
    ctx: web::Data<AppContext>,
    query: web::Query<CheckoutReturnQuery>,
) -> Result<HttpResponse> {
    if query.canceled {
        if let Some(session_id) = query.session_id.as_deref() {
            if let Some(payment) = payment_repo::find_by_provider_payment_id(
                &ctx.pool,
                PaymentProvider::Stripe,
                session_id,
            )
            .await?
            {
                payment_repo::mark_status(&ctx.pool, payment.id, PaymentStatus::Canceled)
                    .await?;
            }
        }
        return Ok(HttpResponse::Ok().json(json!({ "canceled": true, "paid": false })));
    }

    let session_id = match (query.success, query.session_id.as_deref()) {
        (true, Some(session_id)) => session_id,
        _ => {
            return Err(AppError::BadRequest(
                "Missing success/session_id parameters".to_string(),
            ))
        }
    };

    let payment = payment_repo::find_by_provider_payment_id(
        &ctx.pool,
        PaymentProvider::Stripe,
        session_id,
    )
    .await?
    .ok_or(AppError::NotFound("Payment not found".to_string()))?;

    let source = ctx
        .status_source(PaymentProvider::Stripe)
        .ok_or_else(|| AppError::Internal("Stripe not configured".to_string()))?;

    let charge = watcher::ChargeRef {
        payment_id: payment.id,
        provider_reference: payment.provider_payment_id.clone(),
    };
    let paid = watcher::check_once(source.as_ref(), ctx.recorder.as_ref(), &charge).await?;

    Ok(HttpResponse::Ok().json(json!({ "canceled": false, "paid": paid })))
}
