//! Request gate: bearer credential extraction and validation
//!
//! `AuthenticatedAccount` is the extractor protected handlers take as an
//! argument. It resolves the bearer access token through the session manager
//! and attaches the owning account id; every failure collapses into one
//! uniform unauthorized response so a caller probing tokens learns nothing
//! about which check rejected them.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use log::warn;

use crate::errors::AuthError;
use crate::session::SessionManager;

/// Identity resolved from a validated access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccount {
    pub account_id: i64,
}

/// Pull the bearer credential out of the `Authorization` header.
///
/// Strips a literal `"Bearer "` prefix when present; otherwise the raw
/// header value is used as-is.
#[must_use]
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header))
}

fn authenticate_request(req: &HttpRequest) -> Result<AuthenticatedAccount, AuthError> {
    let manager = req
        .app_data::<web::Data<SessionManager>>()
        .ok_or(AuthError::Unauthorized)?;
    let token = bearer_token(req).ok_or(AuthError::Unauthorized)?;

    let record = manager.authenticate(token).map_err(|err| {
        if let AuthError::Storage(ref store_err) = err {
            warn!("credential check hit storage failure: {store_err}");
        }
        AuthError::Unauthorized
    })?;

    Ok(AuthenticatedAccount {
        account_id: record.account_id,
    })
}

impl FromRequest for AuthenticatedAccount {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate_request(req))
    }
}
