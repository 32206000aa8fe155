/// HTTP handlers for payment endpoints
///
/// This module contains handlers for:
/// - PIX: charge creation (Mercado Pago / Efí fallback), status, manual check
/// - Stripe: Checkout session creation and return verification
/// - Tracking: attribution capture and conversion listing
pub mod pix;
pub mod stripe;
pub mod tracking;

// Explicit re-exports to avoid ambiguity
pub use pix::{create_pix_charge, get_payment_status, manual_check};
pub use stripe::{checkout_return, create_checkout};
pub use tracking::{list_conversions, track_visit};
