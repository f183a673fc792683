//! HTTP server core implementation

use crate::config::Config;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, web};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with its shared state.
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let email_transport = build_email_transport(config).await;
        if email_transport.is_none() {
            warn!("Email transport not available; notifications will be skipped");
        }

        let state = AppState::new(config.clone(), email_transport)?;
        Ok(Self { state })
    }

    /// Start the HTTP server and block until shutdown.
    pub async fn start(self) -> Result<()> {
        let server_config = self.state.config.server().clone();
        let bind_addr = server_config.address();
        let workers = server_config.worker_count();
        let state = web::Data::new(self.state);

        info!("Starting HTTP server on {}", bind_addr);

        let server = ActixHttpServer::new(move || {
            let cors_config = &state.config.server().cors;
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST"])
                .allow_any_header()
                .max_age(3600);

            if cors_config.enabled {
                if cors_config.allows_all_origins() {
                    cors = cors.allow_any_origin();
                } else {
                    for origin in &cors_config.allowed_origins {
                        cors = cors.allowed_origin(origin);
                    }
                }
                if cors_config.allow_credentials {
                    cors = cors.supports_credentials();
                }
            }

            App::new()
                .app_data(state.clone())
                .wrap(cors)
                .wrap(TracingLogger::default())
                .route("/health", web::get().to(routes::health::health_check))
                .service(
                    web::scope("/trainee")
                        .route("/single", web::post().to(routes::trainee::create_trainee))
                        .route(
                            "/admin-single",
                            web::post().to(routes::trainee::create_trainee_admin),
                        )
                        .route("/batch", web::post().to(routes::batch::process_batch)),
                )
                .route("/webhook", web::post().to(routes::webhook::receive_webhook))
        })
        .workers(workers)
        .bind(&bind_addr)
        .map_err(|e| GatewayError::Config(format!("Failed to bind {}: {}", bind_addr, e)))?
        .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| GatewayError::Internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(feature = "ses")]
async fn build_email_transport(
    config: &Config,
) -> Option<std::sync::Arc<dyn crate::core::email::EmailTransport>> {
    use crate::core::email::SesTransport;
    use std::sync::Arc;

    let transport = SesTransport::new(&config.email().region).await;
    Some(Arc::new(transport))
}

#[cfg(not(feature = "ses"))]
async fn build_email_transport(
    _config: &Config,
) -> Option<std::sync::Arc<dyn crate::core::email::EmailTransport>> {
    None
}
