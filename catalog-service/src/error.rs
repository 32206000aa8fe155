/// Error types for Catalog Service
///
/// This module defines all error types that can occur in the catalog-service.
/// Errors are converted to appropriate HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::ErrorResponse;
use std::fmt;

/// Result type for catalog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Database operation failed
    DatabaseError(String),

    /// Validation failed
    ValidationError(String),

    /// Email failed the format check
    InvalidEmail(String),

    /// Resource not found
    NotFound(String),

    /// Mail delivery failed
    MailError(String),

    /// Internal server error
    Internal(String),

    /// Bad request
    BadRequest(String),

    /// Conflict (duplicate resource, etc.)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::MailError(msg) => write!(f, "Mail error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::MailError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) | AppError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = match self {
            AppError::DatabaseError(_) => {
                ("server_error", error_types::error_codes::DATABASE_ERROR)
            }
            AppError::ValidationError(_) => {
                ("validation_error", error_types::error_codes::VALIDATION_ERROR)
            }
            AppError::InvalidEmail(_) => {
                ("validation_error", error_types::error_codes::INVALID_EMAIL)
            }
            AppError::NotFound(_) => {
                ("not_found_error", error_types::error_codes::VIDEO_NOT_FOUND)
            }
            AppError::MailError(_) => {
                ("server_error", error_types::error_codes::MAIL_DELIVERY_ERROR)
            }
            AppError::Internal(_) => (
                "server_error",
                error_types::error_codes::INTERNAL_SERVER_ERROR,
            ),
            AppError::BadRequest(_) => {
                ("validation_error", error_types::error_codes::INVALID_REQUEST)
            }
            AppError::Conflict(_) => ("conflict_error", error_types::error_codes::INVALID_REQUEST),
        };

        let message = self.to_string();
        let response = ErrorResponse::new(
            &match status {
                StatusCode::BAD_REQUEST => "Bad Request",
                StatusCode::NOT_FOUND => "Not Found",
                StatusCode::CONFLICT => "Conflict",
                StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
                _ => "Error",
            },
            &message,
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
