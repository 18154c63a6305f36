// Credential lifecycle handlers: login, refresh, and logout
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;

use crate::device;
use crate::errors::AuthError;
use crate::gate::bearer_token;
use crate::session::SessionManager;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Login handler
///
/// Issues an access/refresh pair for the calling device, creating the
/// account on first login.
///
/// # Errors
///
/// Returns `BadRequest` when the email is missing or the account cannot be
/// created, and `Storage` when persisting the session fails.
pub async fn login(
    body: web::Json<LoginRequest>,
    req: HttpRequest,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    let fingerprint = device::fingerprint_from_request(&req);
    let pair = manager.login(&body.email, &body.name, &fingerprint)?;

    info!("issued session pair for account {}", body.email);
    Ok(HttpResponse::Ok().json(pair))
}

/// Refresh handler
///
/// Mints a new access token against the bearer refresh token; the refresh
/// token itself is left untouched.
///
/// # Errors
///
/// Returns `Unauthorized` when the refresh token is missing or no longer
/// usable, and `Storage` when persisting the new access token fails.
pub async fn refresh(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    let token = bearer_token(&req).ok_or(AuthError::Unauthorized)?;
    let access_token = manager.refresh(token)?;

    debug!("minted replacement access token");
    Ok(HttpResponse::Ok().json(json!({ "accessToken": access_token })))
}

/// Logout handler
///
/// Revokes the bearer refresh token and the calling device's access tokens.
///
/// # Errors
///
/// Returns `Unauthorized` when the refresh token is missing, unknown, or
/// already revoked, and `Storage` when the revocation cannot be persisted.
pub async fn logout(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    let token = bearer_token(&req).ok_or(AuthError::Unauthorized)?;
    manager.logout(token)?;

    debug!("session logged out");
    Ok(HttpResponse::Ok().finish())
}
