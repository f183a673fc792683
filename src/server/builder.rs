//! Server startup helper

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use std::path::Path;
use tracing::{info, warn};

/// Load configuration and run the server until shutdown.
///
/// The configuration file is optional: when it is missing the environment
/// (and defaults) take over, matching how the service runs in containers.
pub async fn run_server(config_path: &Path) -> Result<()> {
    info!("Starting trainee gateway");

    let config = if config_path.exists() {
        Config::from_file(config_path).await?
    } else {
        warn!(
            "Configuration file {:?} not found, using environment configuration",
            config_path
        );
        Config::from_env()?
    };

    let server = HttpServer::new(&config).await?;
    info!(
        "Gateway starting at http://{}",
        config.server().address()
    );
    info!("API endpoints:");
    info!("   GET  /health               - Health check");
    info!("   POST /trainee/single       - Create one trainee");
    info!("   POST /trainee/admin-single - Create one trainee (admin)");
    info!("   POST /trainee/batch        - Batch CSV upload (admin)");
    info!("   POST /webhook              - Batch completion callbacks");

    server.start().await
}
