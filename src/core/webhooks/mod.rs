//! Webhook completion callbacks
//!
//! Serializes batch results, signs them, and delivers them to the
//! caller-supplied callback URL with bounded exponential-backoff retries.

pub mod notifier;
pub mod types;

pub use notifier::WebhookNotifier;
pub use types::{WebhookPayload, WebhookSettings};

use crate::utils::error::{GatewayError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Canonical JSON encoding: keys emitted in sorted order so a receiver can
/// recompute the signature from the parsed body. Routing through
/// `serde_json::Value` sorts object keys.
pub fn canonical_json<T: serde::Serialize>(payload: &T) -> Result<String> {
    let value = serde_json::to_value(payload)?;
    Ok(value.to_string())
}

/// HMAC-SHA256 signature (hex) over the canonical payload encoding.
pub fn sign_payload(secret: &str, canonical: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Crypto(e.to_string()))?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a received signature against the canonical payload encoding.
pub fn verify_signature(secret: &str, canonical: &str, signature: &str) -> Result<bool> {
    let expected = sign_payload(secret, canonical)?;
    Ok(expected == signature)
}
