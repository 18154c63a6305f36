//! Error taxonomy for the credential lifecycle
//!
//! Every lifecycle operation fails with one of three kinds: a malformed
//! request, a credential that must not be honored, or a storage failure that
//! has to surface instead of being swallowed. The `ResponseError` impl keeps
//! the unauthorized body fixed so callers cannot distinguish which check
//! rejected a guessed token.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing required login field or account creation failure.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid, expired, or revoked credential. Carries no detail.
    #[error("unauthorized")]
    Unauthorized,

    /// Store operation error, propagated explicitly.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::BadRequest(description) => json!({
                "error": "invalid_request",
                "error_description": description,
            }),
            Self::Unauthorized => json!({
                "error": "unauthorized",
                "error_description": "Authentication is required to access this resource",
            }),
            Self::Storage(_) => json!({
                "error": "server_error",
                "error_description": "An internal server error occurred",
            }),
        };

        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::BadRequest("email is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Storage(StoreError("disk full".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_body_is_fixed() {
        let response = AuthError::Unauthorized.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
