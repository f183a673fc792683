//! Amazon SES transport
//!
//! Sends every message as a raw MIME document (the summary email carries a
//! CSV attachment, which SESv2's simple content cannot express). Requires a
//! verified sender address on the SES identity.

use super::{EmailTransport, OutboundEmail, build_mime};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use aws_sdk_sesv2::Client;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use tracing::debug;

/// SESv2-backed email transport
#[derive(Clone)]
pub struct SesTransport {
    client: Client,
}

impl SesTransport {
    /// Build a transport for the given AWS region, loading credentials
    /// from the default provider chain.
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl EmailTransport for SesTransport {
    async fn send(&self, from: &str, email: &OutboundEmail) -> Result<String> {
        let mime = build_mime(from, email);

        let raw = RawMessage::builder()
            .data(Blob::new(mime.into_bytes()))
            .build()
            .map_err(|e| GatewayError::Email(format!("Failed to build raw message: {}", e)))?;

        let destination = Destination::builder()
            .to_addresses(email.to.clone())
            .build();

        debug!(to = %email.to, subject = %email.subject, "Sending email via SES");

        let response = self
            .client
            .send_email()
            .from_email_address(from)
            .destination(destination)
            .content(EmailContent::builder().raw(raw).build())
            .send()
            .await
            .map_err(|e| GatewayError::Email(e.to_string()))?;

        Ok(response.message_id().unwrap_or_default().to_string())
    }
}
