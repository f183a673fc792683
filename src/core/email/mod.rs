//! Email notifications
//!
//! Best-effort sends over an [`EmailTransport`]: every failure collapses to
//! a logged `false`, nothing propagates into the orchestrator. The admin
//! summary carries a CSV report attachment; welcome emails disclose
//! credentials and are therefore sent only for mock batches.

pub mod notifier;
#[cfg(feature = "ses")]
pub mod ses;

pub use notifier::EmailNotifier;
#[cfg(feature = "ses")]
pub use ses::SesTransport;

use crate::utils::error::Result;
use async_trait::async_trait;

/// File attached to an outbound message
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// One outbound message
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub attachment: Option<Attachment>,
}

/// Transactional email transport (SES or a test double).
///
/// Returns a provider message id on success.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, from: &str, email: &OutboundEmail) -> Result<String>;
}

/// Build the raw MIME message for an outbound email.
///
/// Text-only mails are plain `text/plain`; attachments produce a
/// `multipart/mixed` message with the attachment base64-encoded.
pub fn build_mime(from: &str, email: &OutboundEmail) -> String {
    use base64::Engine as _;

    match &email.attachment {
        None => format!(
            "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}\r\n",
            from = from,
            to = email.to,
            subject = email.subject,
            body = email.body_text,
        ),
        Some(attachment) => {
            let boundary = format!("=_boundary_{}", uuid::Uuid::new_v4().simple());
            let encoded = base64::engine::general_purpose::STANDARD.encode(&attachment.content);
            // 76-character lines per RFC 2045
            let wrapped = encoded
                .as_bytes()
                .chunks(76)
                .map(|chunk| String::from_utf8_lossy(chunk).to_string())
                .collect::<Vec<_>>()
                .join("\r\n");

            format!(
                "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nMIME-Version: 1.0\r\nContent-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n--{boundary}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}\r\n--{boundary}\r\nContent-Type: {content_type}; name=\"{filename}\"\r\nContent-Disposition: attachment; filename=\"{filename}\"\r\nContent-Transfer-Encoding: base64\r\n\r\n{payload}\r\n--{boundary}--\r\n",
                from = from,
                to = email.to,
                subject = email.subject,
                boundary = boundary,
                body = email.body_text,
                content_type = attachment.content_type,
                filename = attachment.filename,
                payload = wrapped,
            )
        }
    }
}
