// Account handler: current authenticated identity
use actix_web::{web, HttpResponse};

use crate::errors::AuthError;
use crate::gate::AuthenticatedAccount;
use crate::session::SessionManager;

/// Current account handler
///
/// # Errors
///
/// Returns `Unauthorized` via the request gate or when the account vanished
/// underneath a live token, and `Storage` when the lookup fails.
pub async fn current_account(
    auth: AuthenticatedAccount,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthError> {
    let account = manager.account(auth.account_id)?;
    Ok(HttpResponse::Ok().json(account))
}
