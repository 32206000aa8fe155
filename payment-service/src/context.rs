/// Shared application context for payment-service
///
/// Bundles the database pool, provider clients and watcher wiring that
/// handlers need. Registered once as actix app data.
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::{Config, WatcherSettings};
use crate::models::{Payment, PaymentProvider};
use crate::providers::{EfiClient, MercadoPagoClient, StatusSource, StripeClient};
use crate::services::{ChargeRef, ConfirmationSink, ConfirmationWatcher, ConversionRecorder};

pub struct AppContext {
    pub pool: PgPool,
    pub mercadopago: Arc<MercadoPagoClient>,
    pub efi: Option<Arc<EfiClient>>,
    pub stripe: Arc<StripeClient>,
    pub recorder: Arc<ConversionRecorder>,
    pub watcher_settings: WatcherSettings,
    pub shutdown: watch::Receiver<bool>,
}

impl AppContext {
    pub fn new(pool: PgPool, config: &Config, shutdown: watch::Receiver<bool>) -> Self {
        let recorder = Arc::new(ConversionRecorder::new(pool.clone(), &config.tracking));

        Self {
            pool,
            mercadopago: Arc::new(MercadoPagoClient::new(&config.mercadopago)),
            efi: config.efi.as_ref().map(|c| Arc::new(EfiClient::new(c))),
            stripe: Arc::new(StripeClient::new(&config.stripe)),
            recorder,
            watcher_settings: config.watcher.clone(),
            shutdown,
        }
    }

    /// Status source for the provider backing a charge
    pub fn status_source(&self, provider: PaymentProvider) -> Option<Arc<dyn StatusSource>> {
        match provider {
            PaymentProvider::MercadoPago => {
                Some(self.mercadopago.clone() as Arc<dyn StatusSource>)
            }
            PaymentProvider::Efi => self
                .efi
                .clone()
                .map(|client| client as Arc<dyn StatusSource>),
            PaymentProvider::Stripe => Some(self.stripe.clone() as Arc<dyn StatusSource>),
        }
    }

    /// Start the confirmation watcher for a freshly created charge
    pub fn spawn_watch(&self, payment: &Payment) {
        let Some(provider) = payment.get_provider() else {
            tracing::error!(payment_id = %payment.id, provider = %payment.provider,
                "Unknown provider on charge, watcher not started");
            return;
        };
        let Some(source) = self.status_source(provider) else {
            tracing::error!(payment_id = %payment.id, provider = %payment.provider,
                "Provider not configured, watcher not started");
            return;
        };

        let watcher = ConfirmationWatcher::new(
            source,
            self.recorder.clone() as Arc<dyn ConfirmationSink>,
            self.watcher_settings.clone(),
            self.shutdown.clone(),
        );
        watcher.spawn(ChargeRef {
            payment_id: payment.id,
            provider_reference: payment.provider_payment_id.clone(),
        });
    }
}
