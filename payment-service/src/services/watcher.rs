/// Payment confirmation watcher
///
/// One configurable poller for every provider, replacing the per-page
/// polling loops of the old web client. Given a charge reference it polls
/// the provider's status source until the first paid observation, a
/// non-paid terminal status, the ceiling, or shutdown.
///
/// Cadence: an optional immediate check shortly after charge creation
/// (catches charges a server-side webhook already settled), then the
/// initial delay, then a fixed interval. Poll errors are logged and the
/// cadence continues unchanged; there is no backoff and no retry budget.
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use crate::config::WatcherSettings;
use crate::models::PaymentStatus;
use crate::providers::StatusSource;

/// Delay before the immediate check fires
pub const IMMEDIATE_CHECK_DELAY: Duration = Duration::from_secs(2);

/// Charge under watch: our row plus the provider's reference
#[derive(Debug, Clone)]
pub struct ChargeRef {
    pub payment_id: Uuid,
    pub provider_reference: String,
}

/// Confirmation side-effect runner
///
/// `confirm` must be idempotent across racing observers (watcher, manual
/// check, Stripe return): it returns true only for the observation that
/// performed the paid transition, and side effects fire only then.
#[async_trait]
pub trait ConfirmationSink: Send + Sync {
    async fn confirm(&self, payment_id: Uuid) -> bool;

    /// Charge abandoned at the polling ceiling
    async fn expire(&self, payment_id: Uuid);

    /// Provider reported a non-paid terminal status
    async fn terminate(&self, payment_id: Uuid, status: PaymentStatus);
}

/// How a watch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// First paid observation; side effects ran
    Confirmed,
    /// Paid observed, but another observer had already confirmed
    AlreadyConfirmed,
    /// Provider reported failed/canceled/expired
    Terminated(PaymentStatus),
    /// Ceiling reached with the charge still pending
    TimedOut,
    /// Service shutting down
    ShutDown,
}

#[derive(Clone)]
pub struct ConfirmationWatcher {
    source: Arc<dyn StatusSource>,
    sink: Arc<dyn ConfirmationSink>,
    settings: WatcherSettings,
    shutdown: watch::Receiver<bool>,
}

impl ConfirmationWatcher {
    pub fn new(
        source: Arc<dyn StatusSource>,
        sink: Arc<dyn ConfirmationSink>,
        settings: WatcherSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
            shutdown,
        }
    }

    /// Poll the charge until a terminal outcome
    pub async fn watch(&self, charge: ChargeRef) -> WatchOutcome {
        let started = Instant::now();
        let deadline = started + self.settings.max_wait();
        let mut shutdown = self.shutdown.clone();

        let mut pending_immediate =
            self.settings.immediate_check && IMMEDIATE_CHECK_DELAY < self.settings.initial_delay();
        let mut next = if pending_immediate {
            started + IMMEDIATE_CHECK_DELAY
        } else {
            started + self.settings.initial_delay()
        };

        loop {
            if next > deadline {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            return WatchOutcome::ShutDown;
                        }
                        continue;
                    }
                    _ = sleep_until(deadline) => {
                        tracing::info!(
                            payment_id = %charge.payment_id,
                            waited_secs = started.elapsed().as_secs(),
                            "Polling ceiling reached, abandoning charge"
                        );
                        self.sink.expire(charge.payment_id).await;
                        return WatchOutcome::TimedOut;
                    }
                }
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return WatchOutcome::ShutDown;
                    }
                }
                _ = sleep_until(next) => {
                    match self.source.charge_status(&charge.provider_reference).await {
                        Ok(PaymentStatus::Paid) => {
                            return if self.sink.confirm(charge.payment_id).await {
                                WatchOutcome::Confirmed
                            } else {
                                WatchOutcome::AlreadyConfirmed
                            };
                        }
                        Ok(PaymentStatus::Pending) => {}
                        Ok(status) => {
                            tracing::info!(
                                payment_id = %charge.payment_id,
                                status = status.as_str(),
                                "Provider reported terminal status"
                            );
                            self.sink.terminate(charge.payment_id, status).await;
                            return WatchOutcome::Terminated(status);
                        }
                        Err(e) => {
                            // Keep the cadence; transient failures are expected
                            tracing::warn!(
                                payment_id = %charge.payment_id,
                                error = %e,
                                "Status check failed, continuing on same interval"
                            );
                        }
                    }

                    next = if pending_immediate {
                        pending_immediate = false;
                        (started + self.settings.initial_delay()).max(Instant::now())
                    } else {
                        next + self.settings.interval()
                    };
                }
            }
        }
    }

    /// Spawn the watch as a background task
    pub fn spawn(&self, charge: ChargeRef) -> JoinHandle<WatchOutcome> {
        let watcher = self.clone();
        tokio::spawn(async move { watcher.watch(charge).await })
    }
}

/// One out-of-band check, identical in shape to the polled check.
///
/// Backs the manual "I already paid" button and the Stripe return
/// verification. Returns whether a paid status was observed.
pub async fn check_once(
    source: &dyn StatusSource,
    sink: &dyn ConfirmationSink,
    charge: &ChargeRef,
) -> crate::error::Result<bool> {
    match source.charge_status(&charge.provider_reference).await? {
        PaymentStatus::Paid => {
            sink.confirm(charge.payment_id).await;
            Ok(true)
        }
        PaymentStatus::Pending => Ok(false),
        status => {
            sink.terminate(charge.payment_id, status).await;
            Ok(false)
        }
    }
}
