//! Error handling for the Gateway
//!
//! This module defines the top-level error type used throughout the gateway.
//! Per-row processing errors carry their own flat `error_type` tags (see
//! `core::models::batch::ErrorType`); this enum covers transport, config,
//! and request-boundary failures.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the Gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors (missing/invalid bearer token)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Authorization errors (valid identity, insufficient role)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// CMS errors (GraphQL/REST call to the Strapi backend failed)
    #[error("CMS error during {operation}: {message}")]
    Cms {
        /// The CMS operation that failed
        operation: &'static str,
        /// Error detail from transport or GraphQL response
        message: String,
    },

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Email service errors
    #[error("Email error: {0}")]
    Email(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Construct a CMS error for the named operation.
    pub fn cms(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Cms {
            operation,
            message: message.into(),
        }
    }

    /// Flat error code used in HTTP error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Config(_) => "CONFIG_ERROR",
            GatewayError::HttpClient(_) => "HTTP_CLIENT_ERROR",
            GatewayError::Serialization(_) | GatewayError::Yaml(_) => "SERIALIZATION_ERROR",
            GatewayError::Io(_) => "IO_ERROR",
            GatewayError::Auth(_) | GatewayError::Forbidden(_) => "AUTH_ERROR",
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::Cms { .. } => "CMS_ERROR",
            GatewayError::Crypto(_) => "CRYPTO_ERROR",
            GatewayError::Email(_) => "EMAIL_ERROR",
            GatewayError::Internal(_) => "UNEXPECTED_ERROR",
        }
    }
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        let status_code = match self {
            GatewayError::Auth(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => actix_web::http::StatusCode::FORBIDDEN,
            GatewayError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            GatewayError::Cms { .. } => actix_web::http::StatusCode::BAD_GATEWAY,
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        HttpResponse::build(status_code).json(serde_json::json!({
            "success": false,
            "error": {
                "error_type": self.error_code(),
                "error_message": self.to_string(),
            }
        }))
    }
}
