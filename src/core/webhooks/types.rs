//! Webhook type definitions

use crate::core::models::{BatchConfig, BatchMetadata, BatchResult, BatchStatus, ErrorDigest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Delivery limits
pub const MIN_RETRY_COUNT: u32 = 1;
pub const MAX_RETRY_COUNT: u32 = 10;
pub const MIN_RETRY_DELAY_SECS: u64 = 1;
pub const MAX_RETRY_DELAY_SECS: u64 = 60;
/// Per-attempt request timeout
pub const ATTEMPT_TIMEOUT_SECS: u64 = 30;

/// Delivery settings for one batch's callback
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
    pub secret: String,
    pub headers: HashMap<String, String>,
    /// Attempts, clamped to [1, 10]
    pub retry_count: u32,
    /// Initial delay in seconds, clamped to [1, 60]; doubles per attempt
    pub retry_delay: u64,
}

impl WebhookSettings {
    /// Extract callback settings from a batch configuration. Returns `None`
    /// when no callback URL is configured. A missing secret is a config
    /// error caught by [`BatchConfig::validate`]; there is no fallback
    /// secret here.
    pub fn from_batch_config(config: &BatchConfig) -> Option<Self> {
        let url = config.callback_url.clone()?;
        let secret = config.webhook_secret.clone()?;
        Some(Self {
            url,
            secret,
            headers: config.webhook_headers.clone(),
            retry_count: config.retry_count.clamp(MIN_RETRY_COUNT, MAX_RETRY_COUNT),
            retry_delay: config
                .retry_delay
                .clamp(MIN_RETRY_DELAY_SECS, MAX_RETRY_DELAY_SECS),
        })
    }
}

/// Outbound payload for `batch.processed` events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    pub status: BatchStatus,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<ErrorDigest>,
    pub batch: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: BatchMetadata,
}

impl WebhookPayload {
    /// Build the callback payload from an aggregated batch result.
    pub fn from_result(result: &BatchResult) -> Self {
        Self {
            event: "batch.processed".to_string(),
            status: result.status,
            total_processed: result.total_processed,
            successful: result.successful,
            failed: result.failed,
            errors: result.errors.clone(),
            batch: result.batch.clone(),
            timestamp: Utc::now(),
            metadata: result.metadata.clone(),
        }
    }
}
