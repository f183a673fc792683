//! Single trainee creation routes

use crate::core::models::TraineeCreate;
use crate::core::processing::process_single;
use crate::core::saga::ProvisionSaga;
use crate::server::AppState;
use crate::server::auth::{authenticate, bearer_token, require_admin};
use crate::server::routes::{ApiResponse, row_error_response};
use crate::utils::error::Result;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::{info, warn};

/// `POST /trainee/single`: create one trainee inline.
pub async fn create_trainee(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<TraineeCreate>,
) -> Result<HttpResponse> {
    let token = bearer_token(&req)?;
    authenticate(&state, &body.config.run_stage, &token).await?;

    create_and_respond(&state, &body, false).await
}

/// `POST /trainee/admin-single`: admin-gated creation; non-mock accounts
/// additionally get a welcome email in the background.
pub async fn create_trainee_admin(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<TraineeCreate>,
) -> Result<HttpResponse> {
    let token = bearer_token(&req)?;
    let user = authenticate(&state, &body.config.run_stage, &token).await?;
    require_admin(&user)?;

    create_and_respond(&state, &body, true).await
}

async fn create_and_respond(
    state: &AppState,
    request: &TraineeCreate,
    send_welcome: bool,
) -> Result<HttpResponse> {
    let processed = match process_single(&request.trainee, &request.config) {
        Ok(processed) => processed,
        Err(error) => return Ok(row_error_response(error)),
    };

    let cms = state.cms_for(&request.config.run_stage)?;
    let provisioned = match ProvisionSaga::new(&cms).run(&processed).await {
        Ok(provisioned) => provisioned,
        Err(error) => return Ok(row_error_response(error)),
    };

    info!(email = %processed.email, run_stage = %request.config.run_stage, "Trainee created");

    if send_welcome && !request.config.is_mock {
        schedule_welcome_email(state, &request.config.login_url, &processed.email, &processed.password);
    }

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(
            "Trainee created successfully",
            json!({
                "user_id": provisioned.user_id,
                "alluser_id": provisioned.alluser_id,
                "profile_id": provisioned.profile_id,
                "trainee": {
                    "id": provisioned.trainee_record_id,
                    "trainee_id": provisioned.trainee_uuid,
                },
            }),
        )
        .with_batch_info(json!({ "batch": request.config.batch })),
    ))
}

fn schedule_welcome_email(
    state: &AppState,
    login_url: &Option<String>,
    email: &str,
    password: &str,
) {
    let Some(notifier) = state.email_notifier() else {
        warn!(to = %email, "Welcome email skipped: email service not configured");
        return;
    };
    let Some(login_url) = login_url.clone() else {
        warn!(to = %email, "Welcome email skipped: no login URL configured");
        return;
    };

    let email = email.to_string();
    let password = password.to_string();
    tokio::spawn(async move {
        notifier
            .send_welcome(&email, &email, &password, &login_url)
            .await;
    });
}
