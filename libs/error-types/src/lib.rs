//! Unified error response types for Scarlet backend services
//!
//! Every service maps its internal `AppError` to this JSON body so API
//! clients see one consistent shape regardless of which service answered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable machine-readable error codes shared across services
pub mod error_codes {
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    // payment-service
    pub const PAYMENT_NOT_FOUND: &str = "PAYMENT_NOT_FOUND";
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
    pub const CHARGE_ALREADY_SETTLED: &str = "CHARGE_ALREADY_SETTLED";

    // catalog-service
    pub const VIDEO_NOT_FOUND: &str = "VIDEO_NOT_FOUND";
    pub const CATEGORY_NOT_FOUND: &str = "CATEGORY_NOT_FOUND";
    pub const CREATOR_NOT_FOUND: &str = "CREATOR_NOT_FOUND";
    pub const REMOVAL_REQUEST_NOT_FOUND: &str = "REMOVAL_REQUEST_NOT_FOUND";
    pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
    pub const MAIL_DELIVERY_ERROR: &str = "MAIL_DELIVERY_ERROR";
}

/// Error detail carried inside the response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Broad category, e.g. "validation_error", "server_error"
    #[serde(rename = "type")]
    pub error_type: String,
    /// Stable code from [`error_codes`]
    pub code: String,
    /// Human-readable message (no PII)
    pub message: String,
}

/// JSON error body returned by all services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
    pub detail: ErrorDetail,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(title: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: title.to_string(),
            status,
            detail: ErrorDetail {
                error_type: error_type.to_string(),
                code: code.to_string(),
                message: message.to_string(),
            },
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let resp = ErrorResponse::new(
            "Not Found",
            "Payment not found",
            404,
            "not_found_error",
            error_codes::PAYMENT_NOT_FOUND,
        );
        assert_eq!(resp.status, 404);
        assert_eq!(resp.detail.code, "PAYMENT_NOT_FOUND");

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["detail"]["type"], "not_found_error");
    }
}
