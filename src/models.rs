//! Data model for accounts and session credentials
//!
//! Access and refresh tokens are deliberately kept as two separate row types
//! backed by two separate tables. They carry the same fields, but either kind
//! can be revoked independently; the only correlation between a login's pair
//! is the shared `(account_id, device_info)` key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Identity root. Created on first login, never mutated or deleted here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Short-lived credential presented on every protected request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AccessToken {
    pub account_id: i64,
    /// Signed token string, unique across all rows of this kind.
    pub token: String,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation. Refreshing creates a new row instead of extending this.
    pub expires_at: DateTime<Utc>,
    /// Monotonic: flips false -> true exactly once, never back.
    pub revoked: bool,
}

/// Long-lived credential used solely to mint new access tokens.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RefreshToken {
    pub account_id: i64,
    pub token: String,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Access/refresh pair returned from a successful login.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// One entry in the device listing, recovered from an active access token's
/// fingerprint and creation time.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    pub device_info: String,
    pub ip: String,
    pub last_login: DateTime<Utc>,
}
