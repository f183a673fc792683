//! Batch processing types
//!
//! Run configuration, per-row outcomes, and the aggregated batch result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Flat error tags carried on row and batch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    ValidationError,
    AuthError,
    EmptyFileError,
    UserCreationError,
    AlluserCreationError,
    ProfileCreationError,
    TraineeCreationError,
    BatchProcessingError,
    ProcessingError,
    UnexpectedError,
}

/// Structured error attached to a failed row or batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub error_type: ErrorType,
    pub error_message: String,
    /// Pipeline step that produced the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_location: Option<String>,
    /// Contextual data for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_data: Option<Value>,
}

impl RowError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            error_message: message.into(),
            error_location: None,
            error_data: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.error_location = Some(location.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.error_data = Some(data);
        self
    }

    /// Validation failure naming the offending field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorType::ValidationError, message).with_location(format!("{}_validation", field))
    }
}

/// Run parameters for one batch submission, immutable for the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Deployment/tenant selector
    pub run_stage: String,
    /// Batch label (may be empty)
    #[serde(default)]
    pub batch: String,
    /// Role assigned to every created account
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub group_id: Option<String>,
    /// CSV field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// CSV file encoding (`utf-8` or `latin-1`)
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Rows per progress-reporting slice
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub is_mock: bool,
    #[serde(default)]
    pub login_url: Option<String>,
    /// Recipient of the batch summary email
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Completion callback URL; requires `webhook_secret`
    #[serde(default)]
    pub callback_url: Option<String>,
    /// HMAC secret for signing the completion callback
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Extra headers sent with the callback
    #[serde(default)]
    pub webhook_headers: HashMap<String, String>,
    /// Callback delivery attempts, clamped to [1, 10]
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Initial callback retry delay in seconds, clamped to [1, 60]
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    /// Columns that must be present in the upload
    #[serde(default = "default_required_columns")]
    pub required_columns: Vec<String>,
}

impl BatchConfig {
    /// Validate run parameters before any processing starts.
    pub fn validate(&self) -> Result<(), RowError> {
        if self.run_stage.is_empty() {
            return Err(RowError::validation("run_stage", "run_stage is required"));
        }
        if !self.delimiter.is_ascii() {
            return Err(RowError::validation(
                "delimiter",
                "delimiter must be a single ASCII character",
            ));
        }
        match self.encoding.to_lowercase().as_str() {
            "utf-8" | "utf8" | "latin-1" | "latin1" | "iso-8859-1" => {}
            other => {
                return Err(RowError::validation(
                    "encoding",
                    format!("Unsupported encoding: {}", other),
                ));
            }
        }
        if self.chunk_size == 0 {
            return Err(RowError::validation("chunk_size", "chunk_size must be positive"));
        }
        if let Some(url) = &self.login_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RowError::validation(
                    "login_url",
                    "login_url must be a valid HTTP(S) URL",
                ));
            }
        }
        // No silent fallback secret: a signed callback requires its own secret.
        if self.callback_url.is_some()
            && self
                .webhook_secret
                .as_deref()
                .is_none_or(|secret| secret.is_empty())
        {
            return Err(RowError::validation(
                "webhook_secret",
                "webhook_secret is required when callback_url is set",
            ));
        }
        if self.required_columns.is_empty() {
            return Err(RowError::validation(
                "required_columns",
                "required_columns cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Outcome of processing one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum RowOutcome {
    /// The full saga completed; the trainee exists in the CMS
    Success {
        /// CMS trainee-record id
        #[serde(skip_serializing_if = "Option::is_none")]
        trainee_id: Option<String>,
        /// Disclosed only for mock accounts
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    /// The row was rejected or the saga rolled back
    Failed { error: RowError },
}

/// One row's result, appended to the batch aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    /// 1-based CSV data-row index (header excluded)
    pub row: usize,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

impl RowResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RowOutcome::Success { .. })
    }

    /// The attached error, if the row failed.
    pub fn error(&self) -> Option<&RowError> {
        match &self.outcome {
            RowOutcome::Failed { error } => Some(error),
            RowOutcome::Success { .. } => None,
        }
    }
}

/// Aggregate batch status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    PartialSuccess,
    Failed,
}

/// Batch metadata echoed in results and notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub run_stage: String,
    pub role: String,
    pub group_id: Option<String>,
}

/// Digest of one failed row for the webhook payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDigest {
    pub row: usize,
    pub email: String,
    pub error_message: String,
}

/// Aggregated outcome of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    /// Whole-batch error, set only when processing never reached the rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RowError>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub successful_trainees: Vec<RowResult>,
    pub failed_trainees: Vec<RowResult>,
    pub errors: Vec<ErrorDigest>,
    pub batch: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: BatchMetadata,
}

impl BatchResult {
    /// Aggregate per-row results into a batch result.
    ///
    /// Status derivation: `failed` iff every row failed (and there was at
    /// least one), `completed` iff none failed (a header-only upload counts
    /// as completed), else `partial_success`.
    pub fn from_rows(config: &BatchConfig, results: Vec<RowResult>) -> Self {
        let total = results.len();
        let (successful_trainees, failed_trainees): (Vec<_>, Vec<_>) =
            results.into_iter().partition(RowResult::is_success);

        let status = if failed_trainees.is_empty() {
            BatchStatus::Completed
        } else if successful_trainees.is_empty() {
            BatchStatus::Failed
        } else {
            BatchStatus::PartialSuccess
        };

        let errors = failed_trainees
            .iter()
            .map(|row| ErrorDigest {
                row: row.row,
                email: row.email.clone(),
                error_message: row
                    .error()
                    .map(|e| e.error_message.clone())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            status,
            error: None,
            total_processed: total,
            successful: successful_trainees.len(),
            failed: failed_trainees.len(),
            successful_trainees,
            failed_trainees,
            errors,
            batch: config.batch.clone(),
            timestamp: Utc::now(),
            metadata: BatchMetadata {
                run_stage: config.run_stage.clone(),
                role: config.role.clone(),
                group_id: config.group_id.clone(),
            },
        }
    }

    /// Whole-batch failure produced before any row was processed
    /// (unreadable file, missing columns, empty upload).
    pub fn batch_failure(config: &BatchConfig, error: RowError) -> Self {
        Self {
            status: BatchStatus::Failed,
            errors: vec![ErrorDigest {
                row: 0,
                email: "N/A".to_string(),
                error_message: error.error_message.clone(),
            }],
            error: Some(error),
            total_processed: 0,
            successful: 0,
            failed: 0,
            successful_trainees: vec![],
            failed_trainees: vec![],
            batch: config.batch.clone(),
            timestamp: Utc::now(),
            metadata: BatchMetadata {
                run_stage: config.run_stage.clone(),
                role: config.role.clone(),
                group_id: config.group_id.clone(),
            },
        }
    }
}

fn default_role() -> String {
    "trainee".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_chunk_size() -> usize {
    20
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

fn default_required_columns() -> Vec<String> {
    vec!["name".to_string(), "email".to_string()]
}
