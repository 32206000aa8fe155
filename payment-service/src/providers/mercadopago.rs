/// Mercado Pago PIX client
///
/// Creates PIX payments via `POST /v1/payments` and reads their status via
/// `GET /v1/payments/{id}`. The QR payload comes back inline under
/// `point_of_interaction.transaction_data`.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::MercadoPagoConfig;
use crate::error::{AppError, Result};
use crate::models::PaymentStatus;

use super::{PixCharge, StatusSource};

pub struct MercadoPagoClient {
    http: Client,
    base_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MpPayment {
    id: i64,
    status: String,
    point_of_interaction: Option<MpPointOfInteraction>,
}

#[derive(Debug, Deserialize)]
struct MpPointOfInteraction {
    transaction_data: Option<MpTransactionData>,
}

#[derive(Debug, Deserialize)]
struct MpTransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
}

impl MercadoPagoClient {
    pub fn new(config: &MercadoPagoConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Create a PIX payment for the given amount and payer
    pub async fn create_pix_charge(
        &self,
        amount_cents: i64,
        payer_email: &str,
    ) -> Result<PixCharge> {
        let url = format!("{}/v1/payments", self.base_url);
        let body = json!({
            "transaction_amount": amount_cents as f64 / 100.0,
            "description": "Scarlet Premium",
            "payment_method_id": "pix",
            "payer": { "email": payer_email },
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("X-Idempotency-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "Mercado Pago charge creation failed ({}): {}",
                status, text
            )));
        }

        let payment = parse_payment(&text)?;
        let transaction_data = payment
            .point_of_interaction
            .and_then(|poi| poi.transaction_data)
            .ok_or_else(|| {
                AppError::Provider("Mercado Pago response missing PIX QR data".to_string())
            })?;

        Ok(PixCharge {
            provider_payment_id: payment.id.to_string(),
            qr_code: transaction_data.qr_code.unwrap_or_default(),
            qr_code_base64: transaction_data.qr_code_base64.unwrap_or_default(),
            status: map_status(&payment.status),
        })
    }

    async fn fetch_status(&self, payment_id: &str) -> Result<PaymentStatus> {
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "Mercado Pago status check failed ({}): {}",
                status, text
            )));
        }

        let payment = parse_payment(&text)?;
        Ok(map_status(&payment.status))
    }
}

#[async_trait]
impl StatusSource for MercadoPagoClient {
    async fn charge_status(&self, reference: &str) -> Result<PaymentStatus> {
        self.fetch_status(reference).await
    }
}

fn parse_payment(body: &str) -> Result<MpPayment> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Provider(format!("Invalid Mercado Pago response: {}", e)))
}

fn map_status(status: &str) -> PaymentStatus {
    match status {
        "approved" => PaymentStatus::Paid,
        "pending" | "in_process" | "authorized" => PaymentStatus::Pending,
        "rejected" => PaymentStatus::Failed,
        "cancelled" => PaymentStatus::Canceled,
        "expired" => PaymentStatus::Expired,
        other => {
            tracing::warn!(status = other, "Unknown Mercado Pago status, treating as pending");
            PaymentStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("approved"), PaymentStatus::Paid);
        assert_eq!(map_status("pending"), PaymentStatus::Pending);
        assert_eq!(map_status("in_process"), PaymentStatus::Pending);
        assert_eq!(map_status("rejected"), PaymentStatus::Failed);
        assert_eq!(map_status("cancelled"), PaymentStatus::Canceled);
        assert_eq!(map_status("something_new"), PaymentStatus::Pending);
    }

    #[test]
    fn test_parse_payment_with_qr_data() {
        let body = r#"{
            "id": 123456789,
            "status": "pending",
            "point_of_interaction": {
                "transaction_data": {
                    "qr_code": "00020126580014br.gov.bcb.pix",
                    "qr_code_base64": "iVBORw0KGgoAAAANSUhEUg"
                }
            }
        }"#;

        let payment = parse_payment(body).unwrap();
        assert_eq!(payment.id, 123456789);
        assert_eq!(payment.status, "pending");
        let data = payment
            .point_of_interaction
            .unwrap()
            .transaction_data
            .unwrap();
        assert_eq!(data.qr_code.as_deref(), Some("00020126580014br.gov.bcb.pix"));
    }

    #[test]
    fn test_parse_payment_status_only() {
        let body = r#"{"id": 42, "status": "approved"}"#;
        let payment = parse_payment(body).unwrap();
        assert_eq!(map_status(&payment.status), PaymentStatus::Paid);
    }

    #[test]
    fn test_parse_payment_rejects_garbage() {
        assert!(parse_payment("not json").is_err());
    }
}
