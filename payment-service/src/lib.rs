//! Payment Service
//!
//! Captures premium signups: PIX charges (Mercado Pago with Efí fallback),
//! Stripe Checkout sessions, the payment confirmation watcher, and campaign
//! attribution / CPA conversion recording.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
