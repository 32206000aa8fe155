/// Efí (Gerencianet) PIX client
///
/// Fallback PIX rail. Charges go through the `cob` flow: OAuth
/// client-credentials token, `PUT /v2/cob/{txid}`, then a second call to
/// `GET /v2/loc/{id}/qrcode` for the QR payload.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::EfiConfig;
use crate::error::{AppError, Result};
use crate::models::PaymentStatus;

use super::{PixCharge, StatusSource};

/// Renew the cached token this long before the provider expires it
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub struct EfiClient {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    pix_key: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct EfiTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct EfiCob {
    txid: String,
    status: String,
    loc: Option<EfiLoc>,
}

#[derive(Debug, Deserialize)]
struct EfiLoc {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct EfiQrCode {
    qrcode: String,
    #[serde(rename = "imagemQrcode")]
    imagem_qrcode: String,
}

impl EfiClient {
    pub fn new(config: &EfiConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            pix_key: config.pix_key.clone(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let url = format!("{}/oauth/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .json(&json!({ "grant_type": "client_credentials" }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Efí token request failed ({}): {}",
                status, text
            )));
        }

        let token: EfiTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Invalid Efí token response: {}", e)))?;

        let expires_at = Instant::now() + Duration::from_secs(token.expires_in)
            - TOKEN_EXPIRY_MARGIN.min(Duration::from_secs(token.expires_in));
        *guard = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    /// Create a PIX cob charge and fetch its QR payload
    pub async fn create_pix_charge(
        &self,
        amount_cents: i64,
        payer_email: &str,
    ) -> Result<PixCharge> {
        let token = self.access_token().await?;

        // Efí requires a 26-35 char alphanumeric txid
        let txid = Uuid::new_v4().simple().to_string();
        let url = format!("{}/v2/cob/{}", self.base_url, txid);
        let body = json!({
            "calendario": { "expiracao": 900 },
            "valor": { "original": format_brl(amount_cents) },
            "chave": self.pix_key,
            "solicitacaoPagador": format!("Scarlet Premium - {}", payer_email),
        });

        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "Efí charge creation failed ({}): {}",
                status, text
            )));
        }

        let cob = parse_cob(&text)?;
        let loc_id = cob
            .loc
            .ok_or_else(|| AppError::Provider("Efí cob response missing loc".to_string()))?
            .id;

        let qr = self.fetch_qrcode(&token, loc_id).await?;

        Ok(PixCharge {
            provider_payment_id: cob.txid,
            qr_code: qr.qrcode,
            qr_code_base64: strip_data_url_prefix(&qr.imagem_qrcode).to_string(),
            status: map_status(&cob.status),
        })
    }

    async fn fetch_qrcode(&self, token: &str, loc_id: i64) -> Result<EfiQrCode> {
        let url = format!("{}/v2/loc/{}/qrcode", self.base_url, loc_id);
        let response = self.http.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Efí qrcode fetch failed ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Invalid Efí qrcode response: {}", e)))
    }

    async fn fetch_status(&self, txid: &str) -> Result<PaymentStatus> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/cob/{}", self.base_url, txid);
        let response = self.http.get(&url).bearer_auth(&token).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "Efí status check failed ({}): {}",
                status, text
            )));
        }

        let cob = parse_cob(&text)?;
        Ok(map_status(&cob.status))
    }
}

#[async_trait]
impl StatusSource for EfiClient {
    async fn charge_status(&self, reference: &str) -> Result<PaymentStatus> {
        self.fetch_status(reference).await
    }
}

fn parse_cob(body: &str) -> Result<EfiCob> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Provider(format!("Invalid Efí cob response: {}", e)))
}

fn map_status(status: &str) -> PaymentStatus {
    match status {
        "CONCLUIDA" => PaymentStatus::Paid,
        "ATIVA" => PaymentStatus::Pending,
        s if s.starts_with("REMOVIDA") => PaymentStatus::Canceled,
        other => {
            tracing::warn!(status = other, "Unknown Efí status, treating as pending");
            PaymentStatus::Pending
        }
    }
}

/// Efí wants decimal string values, e.g. 2990 -> "29.90"
fn format_brl(amount_cents: i64) -> String {
    format!("{}.{:02}", amount_cents / 100, amount_cents % 100)
}

/// Efí returns the QR image as a data URL; the UI consumes raw base64
fn strip_data_url_prefix(image: &str) -> &str {
    match image.split_once("base64,") {
        Some((_, payload)) => payload,
        None => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(2990), "29.90");
        assert_eq!(format_brl(100), "1.00");
        assert_eq!(format_brl(5), "0.05");
        assert_eq!(format_brl(123456), "1234.56");
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status("CONCLUIDA"), PaymentStatus::Paid);
        assert_eq!(map_status("ATIVA"), PaymentStatus::Pending);
        assert_eq!(
            map_status("REMOVIDA_PELO_USUARIO_RECEBEDOR"),
            PaymentStatus::Canceled
        );
        assert_eq!(map_status("REMOVIDA_PELO_PSP"), PaymentStatus::Canceled);
    }

    #[test]
    fn test_parse_cob() {
        let body = r#"{
            "txid": "7978c0c97ea847e78e8849634473c1f1",
            "status": "ATIVA",
            "loc": { "id": 789 }
        }"#;
        let cob = parse_cob(body).unwrap();
        assert_eq!(cob.txid, "7978c0c97ea847e78e8849634473c1f1");
        assert_eq!(cob.loc.unwrap().id, 789);
    }

    #[test]
    fn test_strip_data_url_prefix() {
        assert_eq!(
            strip_data_url_prefix("data:image/png;base64,iVBORw0KGgo"),
            "iVBORw0KGgo"
        );
        assert_eq!(strip_data_url_prefix("iVBORw0KGgo"), "iVBORw0KGgo");
    }
}
