/// Conversion recording - the confirmation side effects
///
/// On the first paid observation of a charge this records an internal
/// conversion row correlated to the visitor's first-touch attribution and,
/// when the source is a paid-acquisition channel, fires the CPA postback.
/// Both effects are fire-and-forget: failures are logged, never surfaced,
/// and never block confirmation.
use async_trait::async_trait;
use reqwest::Client;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::TrackingConfig;
use crate::db::{payment_repo, tracking_repo};
use crate::models::{Payment, PaymentStatus, Visit};
use crate::services::watcher::ConfirmationSink;

#[derive(Clone)]
pub struct ConversionRecorder {
    pool: PgPool,
    http: Client,
    paid_sources: Vec<String>,
    cpa_callback_url: Option<String>,
}

impl ConversionRecorder {
    pub fn new(pool: PgPool, tracking: &TrackingConfig) -> Self {
        Self {
            pool,
            http: Client::new(),
            paid_sources: tracking.paid_sources.clone(),
            cpa_callback_url: tracking.cpa_callback_url.clone(),
        }
    }

    fn is_paid_source(&self, source: Option<&str>) -> bool {
        match source {
            Some(s) => self.paid_sources.iter().any(|p| p == &s.to_lowercase()),
            None => false,
        }
    }

    /// Record the conversion and notify the traffic source
    async fn run_side_effects(&self, payment: Payment) {
        let visit = match payment.visitor_id {
            Some(visitor_id) => {
                match tracking_repo::find_visit_by_visitor(&self.pool, visitor_id).await {
                    Ok(visit) => visit,
                    Err(e) => {
                        tracing::error!(
                            payment_id = %payment.id,
                            error = %e,
                            "Attribution lookup failed, recording unattributed conversion"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let conversion = match tracking_repo::insert_conversion(
            &self.pool,
            payment.id,
            visit.as_ref(),
            payment.amount_cents,
        )
        .await
        {
            Ok(conversion) => conversion,
            Err(e) => {
                tracing::error!(
                    payment_id = %payment.id,
                    error = %e,
                    "Failed to record conversion"
                );
                return;
            }
        };

        tracing::info!(
            payment_id = %payment.id,
            conversion_id = %conversion.id,
            source = conversion.source.as_deref().unwrap_or("-"),
            "Conversion recorded"
        );

        if let Some(visit) = visit {
            if self.is_paid_source(visit.source.as_deref()) {
                self.send_cpa_postback(conversion.id, &payment, &visit).await;
            }
        }
    }

    async fn send_cpa_postback(&self, conversion_id: Uuid, payment: &Payment, visit: &Visit) {
        let Some(url) = self.cpa_callback_url.as_deref() else {
            return;
        };

        let result = self
            .http
            .get(url)
            .query(&[
                ("payment_id", payment.id.to_string()),
                ("value", format!("{:.2}", payment.amount_cents as f64 / 100.0)),
                ("source", visit.source.clone().unwrap_or_default()),
                ("campaign", visit.campaign.clone().unwrap_or_default()),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                if let Err(e) =
                    tracking_repo::mark_cpa_notified(&self.pool, conversion_id).await
                {
                    tracing::error!(
                        conversion_id = %conversion_id,
                        error = %e,
                        "CPA postback delivered but flag update failed"
                    );
                } else {
                    tracing::info!(conversion_id = %conversion_id, "CPA postback delivered");
                }
            }
            Ok(response) => {
                tracing::warn!(
                    conversion_id = %conversion_id,
                    status = %response.status(),
                    "CPA postback rejected"
                );
            }
            Err(e) => {
                tracing::warn!(
                    conversion_id = %conversion_id,
                    error = %e,
                    "CPA postback failed"
                );
            }
        }
    }
}

#[async_trait]
impl ConfirmationSink for ConversionRecorder {
    async fn confirm(&self, payment_id: Uuid) -> bool {
        let payment = match payment_repo::mark_paid(&self.pool, payment_id).await {
            Ok(Some(payment)) => payment,
            Ok(None) => {
                // Another observer performed the transition first
                return false;
            }
            Err(e) => {
                tracing::error!(payment_id = %payment_id, error = %e, "Paid transition failed");
                return false;
            }
        };

        tracing::info!(
            payment_id = %payment_id,
            provider = %payment.provider,
            "Payment confirmed"
        );

        let recorder = self.clone();
        tokio::spawn(async move {
            recorder.run_side_effects(payment).await;
        });

        true
    }

    async fn expire(&self, payment_id: Uuid) {
        if let Err(e) =
            payment_repo::mark_status(&self.pool, payment_id, PaymentStatus::Expired).await
        {
            tracing::error!(payment_id = %payment_id, error = %e, "Failed to expire charge");
        }
    }

    async fn terminate(&self, payment_id: Uuid, status: PaymentStatus) {
        if let Err(e) = payment_repo::mark_status(&self.pool, payment_id, status).await {
            tracing::error!(payment_id = %payment_id, error = %e, "Failed to record status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder_with_sources(sources: &[&str]) -> ConversionRecorder {
        ConversionRecorder {
            pool: PgPool::connect_lazy("postgresql://localhost/scarlet_test")
                .expect("lazy pool"),
            http: Client::new(),
            paid_sources: sources.iter().map(|s| s.to_string()).collect(),
            cpa_callback_url: None,
        }
    }

    #[tokio::test]
    async fn test_paid_source_matching() {
        let recorder = recorder_with_sources(&["trafficstars", "exoclick"]);
        assert!(recorder.is_paid_source(Some("trafficstars")));
        assert!(recorder.is_paid_source(Some("TrafficStars")));
        assert!(!recorder.is_paid_source(Some("organic")));
        assert!(!recorder.is_paid_source(None));
    }
}
