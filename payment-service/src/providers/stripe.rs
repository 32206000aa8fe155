/// Stripe Checkout client
///
/// Card payments run through Checkout sessions: a form-encoded
/// `POST /v1/checkout/sessions` issues the hosted checkout URL, and the
/// return redirect is verified via `GET /v1/checkout/sessions/{id}`.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::error::{AppError, Result};
use crate::models::PaymentStatus;

use super::StatusSource;

pub struct StripeClient {
    http: Client,
    base_url: String,
    secret_key: String,
    price_id: String,
    success_url: String,
    cancel_url: String,
}

/// Hosted checkout session issued for a card signup
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            secret_key: config.secret_key.clone(),
            price_id: config.price_id.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }

    /// Create a subscription Checkout session for the given customer
    pub async fn create_checkout_session(&self, customer_email: &str) -> Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let params = [
            ("mode", "subscription"),
            ("customer_email", customer_email),
            ("line_items[0][price]", self.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.success_url.as_str()),
            ("cancel_url", self.cancel_url.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "Stripe session creation failed ({}): {}",
                status, text
            )));
        }

        let session = parse_session(&text)?;
        let checkout_url = session.url.ok_or_else(|| {
            AppError::Provider("Stripe session response missing checkout url".to_string())
        })?;

        Ok(CheckoutSession {
            session_id: session.id,
            checkout_url,
        })
    }

    async fn fetch_status(&self, session_id: &str) -> Result<PaymentStatus> {
        let url = format!("{}/v1/checkout/sessions/{}", self.base_url, session_id);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "Stripe session fetch failed ({}): {}",
                status, text
            )));
        }

        let session = parse_session(&text)?;
        Ok(map_payment_status(session.payment_status.as_deref()))
    }
}

#[async_trait]
impl StatusSource for StripeClient {
    async fn charge_status(&self, reference: &str) -> Result<PaymentStatus> {
        self.fetch_status(reference).await
    }
}

fn parse_session(body: &str) -> Result<StripeSession> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Provider(format!("Invalid Stripe response: {}", e)))
}

fn map_payment_status(payment_status: Option<&str>) -> PaymentStatus {
    match payment_status {
        // no_payment_required covers trialing subscriptions
        Some("paid") | Some("no_payment_required") => PaymentStatus::Paid,
        _ => PaymentStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_payment_status() {
        assert_eq!(map_payment_status(Some("paid")), PaymentStatus::Paid);
        assert_eq!(
            map_payment_status(Some("no_payment_required")),
            PaymentStatus::Paid
        );
        assert_eq!(map_payment_status(Some("unpaid")), PaymentStatus::Pending);
        assert_eq!(map_payment_status(None), PaymentStatus::Pending);
    }

    #[test]
    fn test_parse_session() {
        let body = r#"{
            "id": "cs_test_a1b2c3",
            "url": "https://checkout.stripe.com/c/pay/cs_test_a1b2c3",
            "payment_status": "unpaid"
        }"#;
        let session = parse_session(body).unwrap();
        assert_eq!(session.id, "cs_test_a1b2c3");
        assert!(session.url.unwrap().starts_with("https://checkout.stripe.com"));
    }

    #[test]
    fn test_parse_completed_session() {
        let body = r#"{"id": "cs_test_done", "url": null, "payment_status": "paid"}"#;
        let session = parse_session(body).unwrap();
        assert_eq!(
            map_payment_status(session.payment_status.as_deref()),
            PaymentStatus::Paid
        );
    }
}
