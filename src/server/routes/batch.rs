//! Batch trainee upload route
//!
//! Accepts the multipart CSV submission, authorizes the caller, and
//! schedules the batch orchestrator on a background task. The response is
//! an immediate acknowledgement; outcomes are delivered via the configured
//! webhook and admin email.

use crate::core::batch::BatchProcessor;
use crate::core::models::{BatchConfig, RowError};
use crate::server::AppState;
use crate::server::auth::{authenticate, bearer_token, require_admin};
use crate::server::routes::{ApiResponse, row_error_response};
use crate::utils::error::{GatewayError, Result};
use actix_multipart::Multipart;
use actix_web::http::header::{ORIGIN, REFERER};
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const FALLBACK_ORIGIN: &str = "https://dev-tenx.10academy.org";

/// Multipart form decoded into the file plus text fields
struct BatchForm {
    file: Vec<u8>,
    fields: HashMap<String, String>,
}

/// `POST /trainee/batch`
pub async fn process_batch(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse> {
    let token = bearer_token(&req)?;

    let form = read_form(payload, state.config.server().max_upload_size).await?;
    if form.file.is_empty() {
        return Ok(row_error_response(
            RowError::validation("file", "No file provided").with_data(json!({"field": "file"})),
        ));
    }

    let run_stage = form
        .field("run_stage")
        .unwrap_or(&state.config.cms().default_stage)
        .to_string();

    let user = authenticate(&state, &run_stage, &token).await?;
    require_admin(&user)?;

    let config = match build_config(&form, &req, run_stage, user.email.clone()) {
        Ok(config) => config,
        Err(error) => return Ok(row_error_response(error)),
    };
    if let Err(error) = config.validate() {
        return Ok(row_error_response(error));
    }

    let batch = config.batch.clone();
    let admin_email = config.admin_email.clone();

    info!(
        batch = %batch,
        admin = %user.email,
        run_stage = %config.run_stage,
        file_bytes = form.file.len(),
        "Batch submission accepted"
    );

    let cms = Arc::new(state.cms_for(&config.run_stage)?);
    let processor = BatchProcessor::new(
        config,
        cms,
        state.http.clone(),
        state.email_notifier(),
    );
    processor.spawn(form.file);

    Ok(HttpResponse::Accepted().json(
        ApiResponse::success(
            "Batch processing started",
            json!({ "status": "processing", "batch": batch }),
        )
        .with_batch_info(json!({ "batch": batch, "admin_email": admin_email })),
    ))
}

impl BatchForm {
    /// Non-blank text field lookup.
    fn field(&self, name: &str) -> Option<&String> {
        self.fields.get(name).filter(|value| !value.trim().is_empty())
    }
}

async fn read_form(mut payload: Multipart, max_upload_size: usize) -> Result<BatchForm> {
    let mut file = Vec::new();
    let mut fields = HashMap::new();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| GatewayError::Validation(format!("Malformed multipart body: {}", e)))?;

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
            .unwrap_or_default();

        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| GatewayError::Validation(format!("Failed to read upload: {}", e)))?;
            content.extend_from_slice(&chunk);

            if name == "file" && content.len() > max_upload_size {
                return Err(GatewayError::Validation(format!(
                    "Uploaded file exceeds the {} byte limit",
                    max_upload_size
                )));
            }
        }

        if name == "file" {
            file = content;
        } else if !name.is_empty() {
            fields.insert(name, String::from_utf8_lossy(&content).to_string());
        }
    }

    Ok(BatchForm { file, fields })
}

fn build_config(
    form: &BatchForm,
    req: &HttpRequest,
    run_stage: String,
    admin_email: String,
) -> std::result::Result<BatchConfig, RowError> {
    let delimiter = match form.field("delimiter") {
        Some(value) => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(delimiter), None) => delimiter,
                _ => {
                    return Err(RowError::validation(
                        "delimiter",
                        "delimiter must be a single character",
                    ));
                }
            }
        }
        None => ',',
    };

    let chunk_size = match form.field("chunk_size") {
        Some(value) => value.trim().parse::<usize>().map_err(|_| {
            RowError::validation("chunk_size", format!("Invalid chunk_size: {}", value))
        })?,
        None => 20,
    };

    let is_mock = form
        .field("is_mock")
        .map(|value| matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false);

    let retry_count = match form.field("retry_count") {
        Some(value) => value.trim().parse::<u32>().map_err(|_| {
            RowError::validation("retry_count", format!("Invalid retry_count: {}", value))
        })?,
        None => 3,
    };

    let retry_delay = match form.field("retry_delay") {
        Some(value) => value.trim().parse::<u64>().map_err(|_| {
            RowError::validation("retry_delay", format!("Invalid retry_delay: {}", value))
        })?,
        None => 5,
    };

    Ok(BatchConfig {
        run_stage,
        batch: form.field("batch").cloned().unwrap_or_default(),
        role: form
            .field("role")
            .cloned()
            .unwrap_or_else(|| "trainee".to_string()),
        group_id: form.field("group_id").cloned(),
        delimiter,
        encoding: form
            .field("encoding")
            .cloned()
            .unwrap_or_else(|| "utf-8".to_string()),
        chunk_size,
        is_mock,
        login_url: Some(resolve_login_url(form, req)?),
        admin_email: Some(admin_email),
        callback_url: form.field("callback_url").cloned(),
        webhook_secret: form.field("webhook_secret").cloned(),
        webhook_headers: HashMap::new(),
        retry_count,
        retry_delay,
        required_columns: vec!["name".to_string(), "email".to_string()],
    })
}

/// An explicit `login_url` field wins; otherwise the URL is derived from
/// the request's Origin (or Referer) so welcome emails point back at the
/// frontend that submitted the batch.
fn resolve_login_url(form: &BatchForm, req: &HttpRequest) -> std::result::Result<String, RowError> {
    let login_url = match form.field("login_url") {
        Some(url) => url.trim().to_string(),
        None => {
            let origin = req
                .headers()
                .get(ORIGIN)
                .or_else(|| req.headers().get(REFERER))
                .and_then(|value| value.to_str().ok())
                .unwrap_or(FALLBACK_ORIGIN);
            format!("{}/login", origin.trim_end_matches('/'))
        }
    };

    if !login_url.starts_with("http://") && !login_url.starts_with("https://") {
        return Err(RowError::validation(
            "login_url",
            "login_url must be a valid HTTP(S) URL",
        ));
    }
    Ok(login_url)
}
