//! Webhook delivery
//!
//! Fire-and-forget from the orchestrator's perspective: every failure is
//! caught and logged, nothing propagates. Delivery retries with a doubling
//! delay until the attempt budget is exhausted.

use super::types::{ATTEMPT_TIMEOUT_SECS, WebhookPayload, WebhookSettings};
use super::{canonical_json, sign_payload};
use crate::core::models::BatchResult;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

/// Signs and posts batch results to one callback URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    settings: WebhookSettings,
}

impl WebhookNotifier {
    pub fn new(client: Client, settings: WebhookSettings) -> Self {
        Self { client, settings }
    }

    /// Deliver the batch result. Returns whether any attempt succeeded;
    /// never returns an error.
    pub async fn notify_callback(&self, result: &BatchResult) -> bool {
        let payload = WebhookPayload::from_result(result);

        let canonical = match canonical_json(&payload) {
            Ok(canonical) => canonical,
            Err(e) => {
                error!(error = %e, "Failed to serialize webhook payload");
                return false;
            }
        };

        let signature = match sign_payload(&self.settings.secret, &canonical) {
            Ok(signature) => signature,
            Err(e) => {
                error!(error = %e, "Failed to sign webhook payload");
                return false;
            }
        };

        self.deliver(&canonical, &signature).await
    }

    /// POST with bounded exponential backoff. HTTP 200/201/202 counts as
    /// delivered; anything else, including timeouts, is retryable.
    async fn deliver(&self, body: &str, signature: &str) -> bool {
        let mut delay = self.settings.retry_delay;

        for attempt in 1..=self.settings.retry_count {
            let mut request = self
                .client
                .post(&self.settings.url)
                .timeout(Duration::from_secs(ATTEMPT_TIMEOUT_SECS))
                .header("Content-Type", "application/json")
                .header("X-Webhook-Signature", signature);

            for (key, value) in &self.settings.headers {
                request = request.header(key, value);
            }

            match request.body(body.to_string()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if matches!(status, 200 | 201 | 202) {
                        info!(url = %self.settings.url, attempt, "Webhook delivered");
                        return true;
                    }
                    let body = response.text().await.unwrap_or_default();
                    warn!(
                        url = %self.settings.url,
                        attempt,
                        status,
                        response = %body,
                        "Webhook delivery attempt failed"
                    );
                }
                Err(e) if e.is_timeout() => {
                    warn!(url = %self.settings.url, attempt, "Webhook delivery attempt timed out");
                }
                Err(e) => {
                    warn!(url = %self.settings.url, attempt, error = %e, "Webhook delivery attempt failed");
                }
            }

            if attempt < self.settings.retry_count {
                tokio::time::sleep(Duration::from_secs(delay)).await;
                delay *= 2;
            }
        }

        error!(
            url = %self.settings.url,
            attempts = self.settings.retry_count,
            "Webhook delivery failed after all attempts"
        );
        false
    }
}
