/// Payment provider clients
///
/// Each provider exposes charge creation as inherent methods and the status
/// check behind [`StatusSource`], the seam the confirmation watcher polls.
use async_trait::async_trait;

use crate::error::Result;
use crate::models::PaymentStatus;

pub mod efi;
pub mod mercadopago;
pub mod stripe;

pub use efi::EfiClient;
pub use mercadopago::MercadoPagoClient;
pub use stripe::StripeClient;

/// Result of creating a PIX charge at a provider
#[derive(Debug, Clone)]
pub struct PixCharge {
    pub provider_payment_id: String,
    pub qr_code: String,
    pub qr_code_base64: String,
    pub status: PaymentStatus,
}

/// Status lookup for an externally-processed charge
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn charge_status(&self, reference: &str) -> Result<PaymentStatus>;
}
