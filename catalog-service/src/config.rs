/// Configuration management for catalog-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub related: RelatedConfig,
    pub mail: Option<MailConfig>,
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
pub struct RelatedConfig {
    /// How many related videos a playback page shows
    pub limit: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("CATALOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("CATALOG_SERVICE_PORT")
                    .unwrap_or_else(|_| "8091".to_string())
                    .parse()
                    .unwrap_or(8091),
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
            related: RelatedConfig {
                limit: std::env::var("RELATED_VIDEOS_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(12),
            },
            mail: parse_mail_config(),
        })
    }
}

/// SMTP is optional; the marketing blast endpoint fails cleanly when unset
fn parse_mail_config() -> Option<MailConfig> {
    let smtp_host = std::env::var("SMTP_HOST").ok()?;
    let smtp_username = std::env::var("SMTP_USERNAME").ok()?;
    let smtp_password = std::env::var("SMTP_PASSWORD").ok()?;

    Some(MailConfig {
        smtp_host,
        smtp_username,
        smtp_password,
        from_address: std::env::var("MAIL_FROM_ADDRESS")
            .unwrap_or_else(|_| "Scarlet <no-reply@scarlet.app>".to_string()),
    })
}
