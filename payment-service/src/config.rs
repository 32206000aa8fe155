/// Configuration management for payment-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub mercadopago: MercadoPagoConfig,
    pub efi: Option<EfiConfig>,
    pub stripe: StripeConfig,
    pub watcher: WatcherSettings,
    pub tracking: TrackingConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MercadoPagoConfig {
    pub base_url: String,
    pub access_token: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EfiConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub pix_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StripeConfig {
    pub base_url: String,
    pub secret_key: String,
    pub price_id: String,
    /// Premium plan price recorded on checkout rows (Stripe owns billing)
    pub premium_price_cents: i64,
    pub success_url: String,
    pub cancel_url: String,
}

/// Poll cadence for the confirmation watcher.
///
/// One set of knobs for every provider; the per-call-site timings of the
/// old clients are gone on purpose.
#[derive(Clone, Debug, Deserialize)]
pub struct WatcherSettings {
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
    pub max_wait_secs: u64,
    pub immediate_check: bool,
}

impl WatcherSettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrackingConfig {
    /// Traffic sources that count as paid acquisition (CPA postback fires)
    pub paid_sources: Vec<String>,
    /// CPA postback endpoint; no postback when unset
    pub cpa_callback_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("PAYMENT_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PAYMENT_SERVICE_PORT")
                    .unwrap_or_else(|_| "8090".to_string())
                    .parse()
                    .unwrap_or(8090),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/scarlet".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            mercadopago: MercadoPagoConfig {
                base_url: std::env::var("MERCADOPAGO_BASE_URL")
                    .unwrap_or_else(|_| "https://api.mercadopago.com".to_string()),
                access_token: std::env::var("MERCADOPAGO_ACCESS_TOKEN").unwrap_or_default(),
            },
            efi: parse_efi_config(),
            stripe: StripeConfig {
                base_url: std::env::var("STRIPE_BASE_URL")
                    .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
                secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
                price_id: std::env::var("STRIPE_PRICE_ID").unwrap_or_default(),
                premium_price_cents: std::env::var("STRIPE_PREMIUM_PRICE_CENTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2990),
                success_url: std::env::var("STRIPE_SUCCESS_URL").unwrap_or_else(|_| {
                    "https://scarlet.app/premium?success=true&session_id={CHECKOUT_SESSION_ID}"
                        .to_string()
                }),
                cancel_url: std::env::var("STRIPE_CANCEL_URL")
                    .unwrap_or_else(|_| "https://scarlet.app/premium?canceled=true".to_string()),
            },
            watcher: WatcherSettings {
                initial_delay_secs: std::env::var("WATCHER_INITIAL_DELAY_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                interval_secs: std::env::var("WATCHER_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
                max_wait_secs: std::env::var("WATCHER_MAX_WAIT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(600),
                immediate_check: std::env::var("WATCHER_IMMEDIATE_CHECK")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(true),
            },
            tracking: TrackingConfig {
                paid_sources: std::env::var("TRACKING_PAID_SOURCES")
                    .unwrap_or_else(|_| "trafficstars,exoclick,adsterra".to_string())
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
                cpa_callback_url: std::env::var("CPA_CALLBACK_URL").ok(),
            },
        })
    }
}

/// Efí is optional; the PIX path runs Mercado Pago-only when unset
fn parse_efi_config() -> Option<EfiConfig> {
    let client_id = std::env::var("EFI_CLIENT_ID").ok()?;
    let client_secret = std::env::var("EFI_CLIENT_SECRET").ok()?;
    let pix_key = std::env::var("EFI_PIX_KEY").ok()?;

    Some(EfiConfig {
        base_url: std::env::var("EFI_BASE_URL")
            .unwrap_or_else(|_| "https://pix.api.efipay.com.br".to_string()),
        client_id,
        client_secret,
        pix_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_settings_durations() {
        let settings = WatcherSettings {
            initial_delay_secs: 5,
            interval_secs: 10,
            max_wait_secs: 600,
            immediate_check: true,
        };
        assert_eq!(settings.initial_delay(), Duration::from_secs(5));
        assert_eq!(settings.interval(), Duration::from_secs(10));
        assert_eq!(settings.max_wait(), Duration::from_secs(600));
    }
}
