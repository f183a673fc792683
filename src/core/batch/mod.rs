//! Batch orchestrator
//!
//! Parses the uploaded CSV, runs every row through validation and the
//! provisioning saga in strict file order, aggregates the outcomes, and
//! dispatches the completion notifications. No row's failure aborts the
//! batch; structural failures (unreadable file, missing columns) abort
//! before any CMS contact.
//!
//! There is no durable checkpoint: a crash mid-batch loses that batch's
//! progress. Batches are triggered interactively by an admin, who re-runs
//! on failure.

use crate::core::cms::CmsClient;
use crate::core::email::EmailNotifier;
use crate::core::models::{BatchConfig, BatchResult, RowError, RowOutcome, RowResult};
use crate::core::processing::{RowDefaults, process_row, read_table};
use crate::core::saga::ProvisionSaga;
use crate::core::webhooks::{WebhookNotifier, WebhookSettings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives one batch run end to end
pub struct BatchProcessor {
    config: BatchConfig,
    cms: Arc<dyn CmsClient>,
    webhook: Option<WebhookNotifier>,
    email: Option<EmailNotifier>,
}

impl BatchProcessor {
    /// Assemble a processor for one run. The webhook notifier exists only
    /// when the run configures a callback URL.
    pub fn new(
        config: BatchConfig,
        cms: Arc<dyn CmsClient>,
        http: reqwest::Client,
        email: Option<EmailNotifier>,
    ) -> Self {
        let webhook = WebhookSettings::from_batch_config(&config)
            .map(|settings| WebhookNotifier::new(http, settings));
        Self {
            config,
            cms,
            webhook,
            email,
        }
    }

    /// Process the uploaded file and dispatch notifications.
    pub async fn process(&self, file: &[u8]) -> BatchResult {
        let start = Instant::now();
        info!(batch = %self.config.batch, "Starting batch processing");

        let result = self.process_records(file).await;
        self.send_notifications(&result).await;

        info!(
            batch = %self.config.batch,
            total = result.total_processed,
            successful = result.successful,
            failed = result.failed,
            status = ?result.status,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Batch processing completed"
        );
        result
    }

    /// Run the batch on a background task, returning immediately.
    pub fn spawn(self, file: Vec<u8>) -> tokio::task::JoinHandle<BatchResult> {
        tokio::spawn(async move { self.process(&file).await })
    }

    async fn process_records(&self, file: &[u8]) -> BatchResult {
        let table = match read_table(file, &self.config) {
            Ok(table) => table,
            Err(error) => {
                error!(batch = %self.config.batch, error = %error.error_message, "Batch rejected before processing");
                return BatchResult::batch_failure(&self.config, error);
            }
        };

        let missing = table.missing_columns(&self.config.required_columns);
        if !missing.is_empty() {
            let error = RowError::validation(
                "columns",
                format!("Missing required columns: {}", missing.join(", ")),
            );
            error!(batch = %self.config.batch, error = %error.error_message, "Batch rejected before processing");
            return BatchResult::batch_failure(&self.config, error);
        }

        let defaults = RowDefaults::from(&self.config);
        let total = table.rows.len();
        let chunk_size = self.config.chunk_size.max(1);
        let mut results = Vec::with_capacity(total);

        for (index, row) in table.rows.iter().enumerate() {
            let row_num = index + 1;
            results.push(self.process_one(row, row_num, &defaults).await);

            if row_num % chunk_size == 0 || row_num == total {
                info!(
                    batch = %self.config.batch,
                    processed = row_num,
                    total,
                    "Batch progress"
                );
            }
        }

        BatchResult::from_rows(&self.config, results)
    }

    /// One row: normalize, then run the saga. Every outcome becomes a
    /// RowResult; nothing escapes.
    async fn process_one(
        &self,
        row: &HashMap<String, String>,
        row_num: usize,
        defaults: &RowDefaults,
    ) -> RowResult {
        let raw_name = row.get("name").map(|v| v.trim().to_string()).unwrap_or_default();
        let raw_email = row
            .get("email")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default();

        // Rows without the identifying fields are rejected up front; the
        // batch keeps going.
        if raw_name.is_empty() || raw_email.is_empty() {
            warn!(batch = %self.config.batch, row = row_num, "Row rejected: name or email is empty");
            return failed_row(
                row_num,
                raw_name,
                raw_email,
                RowError::validation("row", "Name and email are required fields"),
            );
        }

        let processed = match process_row(row, defaults) {
            Ok(processed) => processed,
            Err(error) => {
                warn!(
                    batch = %self.config.batch,
                    row = row_num,
                    error = %error.error_message,
                    "Row failed validation"
                );
                return failed_row(row_num, raw_name, raw_email, error);
            }
        };

        match ProvisionSaga::new(self.cms.as_ref()).run(&processed).await {
            Ok(provisioned) => RowResult {
                row: row_num,
                name: processed.name,
                email: processed.email,
                outcome: RowOutcome::Success {
                    trainee_id: Some(provisioned.trainee_record_id),
                    password: self.config.is_mock.then_some(processed.password),
                },
            },
            Err(error) => {
                error!(
                    batch = %self.config.batch,
                    row = row_num,
                    email = %processed.email,
                    error_type = ?error.error_type,
                    error = %error.error_message,
                    "Row failed during provisioning"
                );
                failed_row(row_num, processed.name, processed.email, error)
            }
        }
    }

    /// Notifier failures are logged; the computed result stands.
    async fn send_notifications(&self, result: &BatchResult) {
        if let Some(webhook) = &self.webhook {
            if !webhook.notify_callback(result).await {
                error!(batch = %self.config.batch, "Webhook notification failed");
            }
        }

        if let Some(email) = &self.email {
            email.send_batch_summary(&self.config, result).await;
            email.send_welcome_emails(&self.config, result).await;
        } else {
            warn!(batch = %self.config.batch, "Email notifications skipped: email service not configured");
        }
    }
}

fn failed_row(row: usize, name: String, email: String, error: RowError) -> RowResult {
    RowResult {
        row,
        name,
        email,
        outcome: RowOutcome::Failed { error },
    }
}
