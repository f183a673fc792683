//! HTTP route handlers
//!
//! Handlers translate typed results into HTTP responses; no internal code
//! builds responses directly.

pub mod batch;
pub mod health;
pub mod trainee;
pub mod webhook;

use crate::core::models::{ErrorType, RowError};
use actix_web::HttpResponse;
use serde_json::Value;

/// Standard API response envelope
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Structured error (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RowError>,
    /// Batch bookkeeping echoed on batch submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_info: Option<Value>,
}

impl<T> ApiResponse<T>
where
    T: serde::Serialize,
{
    /// Create a successful response
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            batch_info: None,
        }
    }

    /// Attach batch bookkeeping
    pub fn with_batch_info(mut self, batch_info: Value) -> Self {
        self.batch_info = Some(batch_info);
        self
    }
}

impl ApiResponse<Value> {
    /// Create an error response
    pub fn error(message: impl Into<String>, error: RowError) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error),
            batch_info: None,
        }
    }
}

/// Translate a row-level error into an HTTP response. Validation problems
/// are the caller's fault; saga step failures surface as an upstream error.
pub fn row_error_response(error: RowError) -> HttpResponse {
    let builder = match error.error_type {
        ErrorType::ValidationError | ErrorType::EmptyFileError => HttpResponse::BadRequest(),
        ErrorType::AuthError => HttpResponse::Unauthorized(),
        ErrorType::UserCreationError
        | ErrorType::AlluserCreationError
        | ErrorType::ProfileCreationError
        | ErrorType::TraineeCreationError => HttpResponse::BadGateway(),
        _ => HttpResponse::InternalServerError(),
    };
    let mut builder = builder;
    builder.json(ApiResponse::error(error.error_message.clone(), error))
}
