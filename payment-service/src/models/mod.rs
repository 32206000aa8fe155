/// Data models for payment-service
///
/// This module defines structures for:
/// - Payment: a charge created against one of the providers
/// - Visit: first-touch campaign attribution captured from the landing URL
/// - Conversion: a monetized signup correlated to its attribution
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================================
// Payment Models
// ========================================

/// Payment provider backing a charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    MercadoPago,
    Efi,
    Stripe,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MercadoPago => "mercadopago",
            Self::Efi => "efi",
            Self::Stripe => "stripe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mercadopago" => Some(Self::MercadoPago),
            "efi" => Some(Self::Efi),
            "stripe" => Some(Self::Stripe),
            _ => None,
        }
    }
}

/// Charge status in the payment lifecycle
///
/// Providers own the real state machine; these are the states this service
/// distinguishes when polling them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Canceled,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "canceled" => Some(Self::Canceled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Terminal states stop the confirmation watcher
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Payment database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub payer_email: String,
    pub provider: String,
    /// Charge reference issued by the provider (MP payment id, Efí txid,
    /// Stripe session id)
    pub provider_payment_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    /// QR payload for PIX charges; empty for card checkouts
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    /// Attribution correlation key, when the landing page captured one
    pub visitor_id: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Display-only countdown anchor; never cancels polling
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn get_status(&self) -> PaymentStatus {
        PaymentStatus::from_str(&self.status).unwrap_or(PaymentStatus::Pending)
    }

    pub fn get_provider(&self) -> Option<PaymentProvider> {
        PaymentProvider::from_str(&self.provider)
    }
}

/// PIX payment object consumed by the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixChargeResponse {
    pub id: String,
    pub qr_code: String,
    pub qr_code_base64: String,
    pub status: String,
    /// Decimal currency units for display
    pub value: f64,
    pub payment_id: String,
    pub provider: String,
}

impl From<Payment> for PixChargeResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            qr_code: payment.qr_code.unwrap_or_default(),
            qr_code_base64: payment.qr_code_base64.unwrap_or_default(),
            status: payment.status,
            value: payment.amount_cents as f64 / 100.0,
            payment_id: payment.provider_payment_id,
            provider: payment.provider,
        }
    }
}

/// Payment status DTO for UI polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub id: String,
    pub status: String,
    pub paid: bool,
    pub provider: String,
    pub expires_at: Option<i64>,
}

impl From<Payment> for PaymentStatusResponse {
    fn from(payment: Payment) -> Self {
        let paid = payment.get_status() == PaymentStatus::Paid;
        Self {
            id: payment.id.to_string(),
            status: payment.status,
            paid,
            provider: payment.provider,
            expires_at: payment.expires_at.map(|dt| dt.timestamp()),
        }
    }
}

/// Create PIX charge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePixRequest {
    pub email: String,
    pub amount_cents: i64,
    pub visitor_id: Option<Uuid>,
}

/// Create Stripe Checkout session request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    pub email: String,
    pub visitor_id: Option<Uuid>,
}

/// Stripe Checkout session DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub checkout_url: String,
    pub session_id: String,
}

/// Stripe return query: `?success=true&session_id=...` or `?canceled=true`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutReturnQuery {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub canceled: bool,
    pub session_id: Option<String>,
}

// ========================================
// Attribution Models
// ========================================

/// First-touch attribution row captured from the landing URL
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Visit {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub source: Option<String>,
    pub campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub landing_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Track visit request, POSTed by the landing page on first load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackVisitRequest {
    pub visitor_id: Uuid,
    pub source: Option<String>,
    pub campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub landing_path: Option<String>,
}

// ========================================
// Conversion Models
// ========================================

/// CPA conversion record correlated to its first-touch attribution
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversion {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub visit_id: Option<Uuid>,
    pub source: Option<String>,
    pub campaign: Option<String>,
    pub amount_cents: i64,
    /// Whether the paid-acquisition postback was delivered
    pub cpa_notified: bool,
    pub created_at: DateTime<Utc>,
}

/// Conversion response DTO for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub id: String,
    pub payment_id: String,
    pub source: Option<String>,
    pub campaign: Option<String>,
    pub amount_cents: i64,
    pub cpa_notified: bool,
    pub created_at: i64,
}

impl From<Conversion> for ConversionResponse {
    fn from(conversion: Conversion) -> Self {
        Self {
            id: conversion.id.to_string(),
            payment_id: conversion.payment_id.to_string(),
            source: conversion.source,
            campaign: conversion.campaign,
            amount_cents: conversion.amount_cents,
            cpa_notified: conversion.cpa_notified,
            created_at: conversion.created_at.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Canceled,
            PaymentStatus::Expired,
        ] {
            assert_eq!(PaymentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::from_str("approved"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Expired.is_terminal());
    }

    #[test]
    fn test_pix_response_value_in_currency_units() {
        let payment = Payment {
            id: Uuid::new_v4(),
            payer_email: "user@example.com".to_string(),
            provider: "mercadopago".to_string(),
            provider_payment_id: "123456".to_string(),
            amount_cents: 2990,
            currency: "BRL".to_string(),
            status: "pending".to_string(),
            qr_code: Some("00020126...".to_string()),
            qr_code_base64: Some("iVBOR...".to_string()),
            visitor_id: None,
            paid_at: None,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let resp = PixChargeResponse::from(payment);
        assert_eq!(resp.value, 29.90);
        assert_eq!(resp.provider, "mercadopago");
        assert_eq!(resp.payment_id, "123456");
    }
}
