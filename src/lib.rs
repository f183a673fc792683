//! # Trainee Gateway
//!
//! Onboarding backend for trainee applicants: validates incoming records
//! (single submissions or CSV batches), provisions accounts in a headless
//! CMS (Strapi) through a compensating multi-step saga, and reports
//! outcomes through signed webhook callbacks and email notifications.
//!
//! ## Pipeline
//!
//! ```text
//! HTTP upload -> auth check -> batch orchestrator (background)
//!     -> row validator (per row)
//!     -> provisioning saga (user -> all-user -> profile -> trainee)
//!     -> aggregation -> webhook + email notifiers
//! ```
//!
//! Per-row failures never abort a batch; structural failures (unreadable
//! file, missing columns) reject the batch before any CMS contact. Saga
//! rollback is best-effort: compensating deletes run in reverse order and
//! their own failures are logged, never raised.
//!
//! ## Running
//!
//! ```rust,no_run
//! use trainee_gateway::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use core::batch::BatchProcessor;
pub use core::cms::{CmsClient, StrapiClient};
pub use core::models::{
    BatchConfig, BatchResult, BatchStatus, ErrorType, ProcessedTrainee, RowError, RowOutcome,
    RowResult, TraineeCreate,
};
pub use core::saga::ProvisionSaga;
pub use core::webhooks::WebhookNotifier;

use tracing::info;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The assembled gateway service
pub struct Gateway {
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");

        let server = server::HttpServer::new(&config).await?;
        Ok(Self { server })
    }

    /// Run the gateway server until shutdown
    pub async fn run(self) -> Result<()> {
        info!("Starting trainee gateway v{}", VERSION);
        self.server.start().await
    }
}
