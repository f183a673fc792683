//! Webhook signing, delivery, and retry behavior against a mock server

use crate::common::batch_config;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use trainee_gateway::core::models::BatchResult;
use trainee_gateway::core::webhooks::{WebhookNotifier, WebhookSettings, canonical_json, sign_payload};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(url: String, retry_count: u32, retry_delay: u64) -> WebhookSettings {
    let mut config = batch_config();
    config.callback_url = Some(url);
    config.webhook_secret = Some("test-webhook-secret".to_string());
    config.retry_count = retry_count;
    config.retry_delay = retry_delay;
    WebhookSettings::from_batch_config(&config).expect("callback configured")
}

fn sample_result() -> BatchResult {
    BatchResult::from_rows(&batch_config(), vec![])
}

#[tokio::test]
async fn test_webhook_delivered_on_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(
        reqwest::Client::new(),
        settings(format!("{}/hook", server.uri()), 3, 1),
    );
    assert!(notifier.notify_callback(&sample_result()).await);
}

#[tokio::test]
async fn test_webhook_payload_shape_and_signature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(
        reqwest::Client::new(),
        settings(format!("{}/hook", server.uri()), 1, 1),
    );
    assert!(notifier.notify_callback(&sample_result()).await);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    // The body is the canonical (sorted-key) encoding it was signed over
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["event"], "batch.processed");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["total_processed"], 0);
    assert_eq!(body["batch"], "7");
    assert_eq!(body["metadata"]["run_stage"], "dev");
    assert!(body["timestamp"].as_str().is_some());

    // Recompute the HMAC over the canonical body and compare
    let signature = request
        .headers
        .get("X-Webhook-Signature")
        .expect("signature header present")
        .to_str()
        .unwrap()
        .to_string();

    let canonical = canonical_json(&body).unwrap();
    let mut mac = Hmac::<Sha256>::new_from_slice(b"test-webhook-secret").unwrap();
    mac.update(canonical.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    assert_eq!(signature, expected);
    assert_eq!(sign_payload("test-webhook-secret", &canonical).unwrap(), expected);
}

#[tokio::test]
async fn test_webhook_retries_then_succeeds() {
    let server = MockServer::start().await;

    // First two attempts see a 500, the third a 200
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(
        reqwest::Client::new(),
        settings(format!("{}/hook", server.uri()), 3, 1),
    );
    assert!(notifier.notify_callback(&sample_result()).await);
}

#[tokio::test]
async fn test_webhook_gives_up_after_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(
        reqwest::Client::new(),
        settings(format!("{}/hook", server.uri()), 2, 1),
    );

    // Exhausts both attempts, returns false, never panics or raises
    assert!(!notifier.notify_callback(&sample_result()).await);
}

#[tokio::test]
async fn test_webhook_sends_configured_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("X-Tenant", "tenx"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(format!("{}/hook", server.uri()), 1, 1);
    settings
        .headers
        .insert("X-Tenant".to_string(), "tenx".to_string());

    let notifier = WebhookNotifier::new(reqwest::Client::new(), settings);
    assert!(notifier.notify_callback(&sample_result()).await);
}

#[tokio::test]
async fn test_unreachable_callback_returns_false() {
    // Nothing listens on this port; every attempt errors out
    let notifier = WebhookNotifier::new(
        reqwest::Client::new(),
        settings("http://127.0.0.1:9/hook".to_string(), 1, 1),
    );
    assert!(!notifier.notify_callback(&sample_result()).await);
}
