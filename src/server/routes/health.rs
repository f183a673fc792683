//! Liveness endpoint

use actix_web::HttpResponse;
use chrono::Utc;

/// `GET /health`
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": crate::NAME,
        "version": crate::VERSION,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
