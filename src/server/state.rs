//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::cms::StrapiClient;
use crate::core::email::{EmailNotifier, EmailTransport};
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Shared resources available to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// HTTP client reused for CMS and webhook calls
    pub http: reqwest::Client,
    /// Email transport, absent when email delivery is not configured
    pub email_transport: Option<Arc<dyn EmailTransport>>,
}

impl AppState {
    /// Create application state with a shared HTTP client.
    pub fn new(config: Config, email_transport: Option<Arc<dyn EmailTransport>>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                GatewayError::Internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config: Arc::new(config),
            http,
            email_transport,
        })
    }

    /// CMS client bound to the deployment the request targets.
    pub fn cms_for(&self, run_stage: &str) -> Result<StrapiClient> {
        let stage = self.config.cms().stage(run_stage)?;
        StrapiClient::new(self.http.clone(), run_stage, stage)
    }

    /// Email notifier over the configured transport, if any.
    pub fn email_notifier(&self) -> Option<EmailNotifier> {
        self.email_transport.clone().map(|transport| {
            EmailNotifier::new(transport, self.config.email().sender.clone())
        })
    }
}
