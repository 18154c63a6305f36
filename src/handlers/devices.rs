// Device handlers: listing and device-scoped revocation
use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;

use crate::errors::AuthError;
use crate::gate::{bearer_token, AuthenticatedAccount};
use crate::session::SessionManager;

/// Device listing handler
///
/// One entry per active access token of the authenticated account, with the
/// stored fingerprint split back into device info and address.
///
/// # Errors
///
/// Returns `Unauthorized` via the request gate and `Storage` when the
/// listing cannot be read.
pub async fn list_devices(
    auth: AuthenticatedAccount,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    let devices = manager.list_devices(auth.account_id)?;
    Ok(HttpResponse::Ok().json(devices))
}

/// Device logout handler
///
/// Revokes every credential of the device behind the bearer refresh token.
/// The refresh token is the credential here: an invalid, revoked, or
/// expired one is rejected outright.
///
/// # Errors
///
/// Returns `Unauthorized` when the refresh token is unusable and `Storage`
/// when the revocation cannot be persisted.
pub async fn logout_device(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    let token = bearer_token(&req).ok_or(AuthError::Unauthorized)?;
    manager.logout_device(token)?;

    debug!("device logged out");
    Ok(HttpResponse::Ok().finish())
}

/// All-devices logout handler
///
/// Bulk-revokes every credential of the authenticated account, on every
/// device.
///
/// # Errors
///
/// Returns `Unauthorized` via the request gate and `Storage` when the bulk
/// revocation fails.
pub async fn logout_all_devices(
    auth: AuthenticatedAccount,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    manager.logout_all(auth.account_id)?;

    debug!("all devices logged out for account {}", auth.account_id);
    Ok(HttpResponse::Ok().finish())
}
