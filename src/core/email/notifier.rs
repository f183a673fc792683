//! Admin summary and trainee welcome emails

use super::{Attachment, EmailTransport, OutboundEmail};
use crate::core::models::{BatchConfig, BatchResult, RowOutcome, RowResult};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Batch email notifications over a transport
#[derive(Clone)]
pub struct EmailNotifier {
    transport: Arc<dyn EmailTransport>,
    /// Verified sender address; sends short-circuit to `false` when unset
    sender: Option<String>,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn EmailTransport>, sender: Option<String>) -> Self {
        Self { transport, sender }
    }

    /// Send the per-batch summary to the admin, with the CSV report
    /// attached. Best-effort: returns whether the send went through.
    pub async fn send_batch_summary(&self, config: &BatchConfig, result: &BatchResult) -> bool {
        let Some(admin_email) = config.admin_email.as_deref() else {
            warn!(batch = %config.batch, "Admin summary skipped: no admin email configured");
            return false;
        };

        let success_rate = if result.total_processed > 0 {
            result.successful as f64 / result.total_processed as f64 * 100.0
        } else {
            0.0
        };

        let body = format!(
            "Dear Administrator,\n\n\
             The batch processing for Batch {batch} has been completed.\n\n\
             Processing Summary:\n\
             - Total Records: {total}\n\
             - Successfully Processed: {successful}\n\
             - Failed: {failed}\n\
             - Success Rate: {rate:.2}%\n\n\
             Please find attached the detailed CSV report for Batch {batch}.\n\n\
             Best regards,\n\
             System Administrator\n",
            batch = config.batch,
            total = result.total_processed,
            successful = result.successful,
            failed = result.failed,
            rate = success_rate,
        );

        let email = OutboundEmail {
            to: admin_email.to_string(),
            subject: format!("Batch Processing Summary - Batch {}", config.batch),
            body_text: body,
            attachment: Some(Attachment {
                filename: format!("batch_{}_details.csv", config.batch),
                content_type: "text/csv".to_string(),
                content: build_report_csv(result, config.is_mock),
            }),
        };

        self.send("admin_summary", &email).await
    }

    /// Send one welcome email with login credentials.
    pub async fn send_welcome(
        &self,
        email: &str,
        username: &str,
        password: &str,
        login_url: &str,
    ) -> bool {
        let body = format!(
            "Dear Trainee,\n\n\
             Your account has been successfully created on our training platform.\n\n\
             Here are your login credentials:\n\
             Username: {username}\n\
             Password: {password}\n\n\
             You can login at: {login_url}\n\n\
             Please change your password after your first login.\n\n\
             Best regards,\n\
             The Training Team\n",
        );

        let message = OutboundEmail {
            to: email.to_string(),
            subject: "Welcome to Our Training Platform".to_string(),
            body_text: body,
            attachment: None,
        };

        self.send("trainee_welcome", &message).await
    }

    /// Welcome emails for every successful trainee of a mock batch.
    ///
    /// Non-mock batches never get these: the generated credentials would
    /// leak over email for accounts that still require confirmation.
    pub async fn send_welcome_emails(&self, config: &BatchConfig, result: &BatchResult) {
        if !config.is_mock {
            return;
        }
        let Some(login_url) = config.login_url.as_deref() else {
            warn!(batch = %config.batch, "Welcome emails skipped: no login URL configured");
            return;
        };

        for trainee in &result.successful_trainees {
            if let RowOutcome::Success {
                password: Some(password),
                ..
            } = &trainee.outcome
            {
                self.send_welcome(&trainee.email, &trainee.email, password, login_url)
                    .await;
            }
        }
    }

    async fn send(&self, kind: &'static str, email: &OutboundEmail) -> bool {
        let Some(sender) = self.sender.as_deref() else {
            warn!(kind, to = %email.to, "Email skipped: sender address not configured");
            return false;
        };

        match self.transport.send(sender, email).await {
            Ok(message_id) => {
                info!(kind, to = %email.to, message_id = %message_id, "Email delivered");
                true
            }
            Err(e) => {
                error!(kind, to = %email.to, error = %e, "Email delivery failed");
                false
            }
        }
    }
}

/// Per-row report listing every processed row. The password column appears
/// only for mock batches.
fn build_report_csv(result: &BatchResult, is_mock: bool) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["name", "email", "status", "error_message"];
    if is_mock {
        header.push("password");
    }
    let _ = writer.write_record(&header);

    let mut write_row = |row: &RowResult| {
        let status = if row.is_success() { "Success" } else { "Failed" };
        let error_message = row
            .error()
            .map(|e| e.error_message.clone())
            .unwrap_or_default();
        let mut record = vec![
            row.name.clone(),
            row.email.clone(),
            status.to_string(),
            error_message,
        ];
        if is_mock {
            let password = match &row.outcome {
                RowOutcome::Success { password, .. } => password.clone().unwrap_or_default(),
                RowOutcome::Failed { .. } => String::new(),
            };
            record.push(password);
        }
        let _ = writer.write_record(&record);
    };

    result.successful_trainees.iter().for_each(&mut write_row);
    result.failed_trainees.iter().for_each(&mut write_row);

    writer.into_inner().unwrap_or_default()
}
