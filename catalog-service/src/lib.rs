//! Catalog Service
//!
//! Content catalog for the platform: videos, categories, creators,
//! related-video recommendation, count reconciliation, content-removal
//! requests and the marketing mailing list.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod validators;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
