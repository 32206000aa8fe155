/// Marketing mailer
///
/// Sends campaign emails to the captured lead list over SMTP. Per-recipient
/// failures are logged and counted; one bad address never aborts the run.
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::{AppError, Result};

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

/// Outcome of a campaign run
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BlastSummary {
    pub sent: usize,
    pub failed: usize,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::MailError(format!("SMTP relay setup failed: {}", e)))?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Send one campaign email to every recipient
    pub async fn send_campaign(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> BlastSummary {
        let mut summary = BlastSummary { sent: 0, failed: 0 };

        for recipient in recipients {
            match self.send_one(recipient, subject, html_body).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(recipient = %recipient, error = %e, "Campaign send failed");
                }
            }
        }

        tracing::info!(
            sent = summary.sent,
            failed = summary.failed,
            "Campaign blast finished"
        );
        summary
    }

    async fn send_one(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| AppError::MailError(format!("Invalid from address: {}", e)))?,
            )
            .to(recipient
                .parse()
                .map_err(|e| AppError::MailError(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::MailError(format!("Message build failed: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::MailError(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}
