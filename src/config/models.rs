//! Configuration models
//!
//! Serde structs for the gateway's YAML/environment configuration: HTTP
//! server settings, per-stage CMS deployments, and email delivery.

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// CMS deployment configuration
    #[serde(default)]
    pub cms: CmsConfig,
    /// Email delivery configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Inbound webhook receiver configuration
    #[serde(default)]
    pub webhook_receiver: WebhookReceiverConfig,
}

impl GatewayConfig {
    /// Build a configuration from environment variables.
    ///
    /// `GATEWAY_HOST`/`GATEWAY_PORT` override the server address and
    /// `EMAIL_SENDER` sets the verified SES sender. CMS stage tokens are
    /// always resolved from the environment at request time (see
    /// [`StageConfig::resolve_token`]), so no token appears here.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("GATEWAY_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("GATEWAY_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid GATEWAY_PORT: {}", e)))?;
        }
        if let Ok(sender) = std::env::var("EMAIL_SENDER") {
            config.email.sender = Some(sender);
        }
        if let Ok(secret) = std::env::var("WEBHOOK_RECEIVER_SECRET") {
            config.webhook_receiver.secret = Some(secret);
        }

        Ok(config)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of worker threads
    pub workers: Option<usize>,
    /// Maximum upload size in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            max_upload_size: default_max_upload_size(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the number of workers (defaults to CPU count)
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validate server configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.max_upload_size == 0 {
            return Err("Max upload size cannot be 0".to_string());
        }
        Ok(())
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Whether CORS handling is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Allowed origins; `*` allows any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Allow credentialed requests
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_allowed_origins(),
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Whether any origin is allowed
    pub fn allows_all_origins(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// CMS (Strapi) deployment configuration
///
/// Each `run_stage` maps to one deployment with its own API root and
/// credential. Tokens come from config or from an environment variable,
/// never hard-coded defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Stage used when a request does not name one
    #[serde(default = "default_stage")]
    pub default_stage: String,
    /// run_stage name -> deployment settings
    #[serde(default = "default_stages")]
    pub stages: HashMap<String, StageConfig>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            default_stage: default_stage(),
            stages: default_stages(),
        }
    }
}

impl CmsConfig {
    /// Look up the deployment for a run stage.
    pub fn stage(&self, run_stage: &str) -> Result<&StageConfig> {
        self.stages.get(run_stage).ok_or_else(|| {
            GatewayError::Config(format!("Unknown run_stage: {}", run_stage))
        })
    }

    /// Validate CMS configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.stages.is_empty() {
            return Err("At least one CMS stage must be configured".to_string());
        }
        if !self.stages.contains_key(&self.default_stage) {
            return Err(format!(
                "Default stage '{}' is not among configured stages",
                self.default_stage
            ));
        }
        for (name, stage) in &self.stages {
            let url = url::Url::parse(&stage.url)
                .map_err(|e| format!("Stage '{}' has an invalid URL: {}", name, e))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(format!("Stage '{}' URL must be HTTP or HTTPS", name));
            }
        }
        Ok(())
    }
}

/// One CMS deployment (API root + credential source)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// API root, e.g. `https://stage-cms.10academy.org`
    pub url: String,
    /// Bearer token, if provided inline (discouraged outside development)
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable holding the bearer token
    #[serde(default)]
    pub token_env: Option<String>,
}

impl StageConfig {
    /// Resolve the bearer token for this deployment.
    ///
    /// Inline token wins, then the configured env var, then `STRAPI_TOKEN`.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = &self.token {
            if !token.is_empty() {
                return Ok(token.clone());
            }
        }

        let var = self.token_env.as_deref().unwrap_or("STRAPI_TOKEN");
        std::env::var(var).map_err(|_| {
            GatewayError::Config(format!("CMS token not found in environment variable {}", var))
        })
    }
}

/// Email delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Verified sender address; sends are disabled when unset
    #[serde(default)]
    pub sender: Option<String>,
    /// AWS region for SES
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender: None,
            region: default_region(),
        }
    }
}

impl EmailConfig {
    /// Validate email configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(sender) = &self.sender {
            if !sender.contains('@') {
                return Err(format!("Sender address '{}' is not an email address", sender));
            }
        }
        if self.region.is_empty() {
            return Err("Email region cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Inbound webhook receiver configuration
///
/// When a secret is configured, unsigned or wrongly-signed callbacks to
/// `POST /webhook` are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebhookReceiverConfig {
    /// HMAC secret for verifying `X-Webhook-Signature`
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_size() -> usize {
    10 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://0.0.0.0:8009".to_string(),
        "http://0.0.0.0:8008".to_string(),
        "https://user-management.10academy.org".to_string(),
    ]
}

fn default_stage() -> String {
    "prod".to_string()
}

fn default_stages() -> HashMap<String, StageConfig> {
    let mut stages = HashMap::new();
    stages.insert(
        "dev".to_string(),
        StageConfig {
            url: "https://dev-cms.10academy.org".to_string(),
            token: None,
            token_env: Some("STRAPI_TOKEN_DEV".to_string()),
        },
    );
    stages.insert(
        "staging".to_string(),
        StageConfig {
            url: "https://stage-cms.10academy.org".to_string(),
            token: None,
            token_env: Some("STRAPI_TOKEN_STAGING".to_string()),
        },
    );
    stages.insert(
        "prod".to_string(),
        StageConfig {
            url: "https://cms.10academy.org".to_string(),
            token: None,
            token_env: Some("STRAPI_TOKEN_PROD".to_string()),
        },
    );
    stages
}

fn default_region() -> String {
    "us-east-1".to_string()
}
