//! Request authentication and authorization
//!
//! Bearer tokens are validated against the CMS `me` query for the
//! deployment the request targets; admin-gated routes additionally require
//! an allow-listed role. Failures are typed errors translated to 401/403
//! at the HTTP boundary.

use crate::core::cms::{AuthenticatedUser, CmsClient};
use crate::server::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;
use tracing::debug;

/// Roles allowed on admin-gated routes
pub const ADMIN_ROLES: &[&str] = &["Authenticated", "Staff"];

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(req: &HttpRequest) -> Result<String> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| GatewayError::Auth("Missing Authorization header".to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| GatewayError::Auth("Malformed Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Auth("Authorization header must be a Bearer token".to_string()))
}

/// Validate the token against the CMS and return the caller's identity.
pub async fn authenticate(
    state: &AppState,
    run_stage: &str,
    token: &str,
) -> Result<AuthenticatedUser> {
    let cms = state.cms_for(run_stage)?;
    let user = cms
        .me(token)
        .await
        .map_err(|e| GatewayError::Auth(format!("Invalid authentication credentials: {}", e)))?;

    debug!(user = %user.email, role = %user.role, "Authenticated caller");
    Ok(user)
}

/// Admin role check for gated routes.
pub fn require_admin(user: &AuthenticatedUser) -> Result<()> {
    if ADMIN_ROLES.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(GatewayError::Forbidden(format!(
            "Insufficient permissions. Admin access required (role: {})",
            user.role
        )))
    }
}
