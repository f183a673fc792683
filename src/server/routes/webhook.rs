//! Inbound webhook receiver
//!
//! Accepts batch-completion callbacks. When a receiver secret is
//! configured, the `X-Webhook-Signature` header must carry a valid
//! HMAC-SHA256 over the canonical encoding of the body; unsigned posts are
//! rejected in that case.

use crate::core::webhooks::{canonical_json, verify_signature};
use crate::server::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;
use tracing::{info, warn};

const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// `POST /webhook`
pub async fn receive_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| GatewayError::Validation("Invalid JSON payload".to_string()))?;

    if let Some(secret) = &state.config.gateway.webhook_receiver.secret {
        let signature = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| GatewayError::Auth("Missing webhook signature".to_string()))?;

        let canonical = canonical_json(&payload)?;
        if !verify_signature(secret, &canonical, signature)? {
            warn!("Webhook rejected: signature mismatch");
            return Err(GatewayError::Auth("Invalid webhook signature".to_string()));
        }
    }

    let status = payload["status"].as_str().unwrap_or("unknown");
    let batch = payload["batch"].as_str().unwrap_or_default();
    match status {
        "completed" => info!(batch, "Batch processed successfully"),
        "partial_success" => {
            warn!(batch, errors = %payload["errors"], "Batch partially successful")
        }
        _ => warn!(batch, status, errors = %payload["errors"], "Batch failed"),
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "received",
        "message": "Webhook processed successfully",
        "data": payload,
    })))
}
