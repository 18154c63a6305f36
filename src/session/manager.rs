//! Session Manager - the credential lifecycle state machine
//!
//! A token is usable only while it is ACTIVE: present in the store, not
//! revoked, and not past its stored expiry. `EXPIRED` is derived from time,
//! `REVOKED` is an explicit, permanent flag; both are terminal.
//!
//! The manager owns no cross-request state. Every check round-trips to the
//! store so a revocation written by one request is visible to the next, and
//! no operation here locks, queues, or retries. Two concurrent refreshes of
//! one refresh token may both succeed and both produce valid access tokens;
//! there is no single-use enforcement.

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::warn;

use crate::codec::CredentialCodec;
use crate::device::split_fingerprint;
use crate::errors::AuthError;
use crate::models::{AccessToken, Account, DeviceEntry, RefreshToken, TokenPair};
use crate::store::SessionStore;

/// Central coordination point for session operations. Cheap to clone; all
/// shared state lives behind the store.
#[derive(Clone)]
pub struct SessionManager {
    codec: CredentialCodec,
    store: Arc<dyn SessionStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        codec: CredentialCodec,
        store: Arc<dyn SessionStore>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            store,
            access_ttl,
            refresh_ttl,
        }
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Log a client in, creating the account on first sight.
    ///
    /// Issues one access token and one refresh token bound to the device
    /// fingerprint and persists both as new rows. Sessions of the same
    /// account on other devices are untouched.
    ///
    /// # Errors
    ///
    /// `BadRequest` if the email is missing or account creation fails;
    /// `Storage` if persisting either row fails.
    pub fn login(&self, email: &str, name: &str, fingerprint: &str) -> Result<TokenPair, AuthError> {
        if email.is_empty() {
            return Err(AuthError::BadRequest("email is required".to_string()));
        }

        let account = match self.store.find_account_by_email(email)? {
            Some(account) => account,
            None => self.store.create_account(name, email).map_err(|err| {
                warn!("account creation failed for {email}: {err}");
                AuthError::BadRequest("account creation failed".to_string())
            })?,
        };

        let now = Utc::now();
        let access = self.codec.issue(account.id, self.access_ttl);
        let refresh = self.codec.issue(account.id, self.refresh_ttl);

        self.store.save_access_token(&AccessToken {
            account_id: account.id,
            token: access.clone(),
            device_info: fingerprint.to_string(),
            created_at: now,
            expires_at: now + self.access_ttl,
            revoked: false,
        })?;
        self.store.save_refresh_token(&RefreshToken {
            account_id: account.id,
            token: refresh.clone(),
            device_info: fingerprint.to_string(),
            created_at: now,
            expires_at: now + self.refresh_ttl,
            revoked: false,
        })?;

        Ok(TokenPair {
            access_token: access,
            refresh_token: refresh,
        })
    }

    /// Mint a new access token against a still-valid refresh token.
    ///
    /// The new access row is bound to the fingerprint stored on the refresh
    /// row. The refresh token itself is left untouched: not rotated, not
    /// extended.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the refresh token fails to decode, is unknown,
    /// revoked, past its stored expiry, or its account no longer exists;
    /// `Storage` on store failure.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        self.codec
            .decode(refresh_token)
            .ok_or(AuthError::Unauthorized)?;

        let record = self
            .store
            .find_refresh_token(refresh_token)?
            .ok_or(AuthError::Unauthorized)?;
        if record.revoked || Utc::now() > record.expires_at {
            return Err(AuthError::Unauthorized);
        }

        let account = self
            .store
            .find_account_by_id(record.account_id)?
            .ok_or(AuthError::Unauthorized)?;

        let now = Utc::now();
        let access = self.codec.issue(account.id, self.access_ttl);
        self.store.save_access_token(&AccessToken {
            account_id: account.id,
            token: access.clone(),
            device_info: record.device_info,
            created_at: now,
            expires_at: now + self.access_ttl,
            revoked: false,
        })?;

        Ok(access)
    }

    // =========================================================================
    // Revocation
    // =========================================================================

    /// Log out the session behind a refresh token.
    ///
    /// Revokes the refresh row, then every active access row of the same
    /// account whose fingerprint matches the refresh row's. A second call on
    /// the same token fails instead of silently succeeding.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token fails to decode, is unknown, or already
    /// revoked; `Storage` on store failure.
    pub fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.codec
            .decode(refresh_token)
            .ok_or(AuthError::Unauthorized)?;

        let mut record = self
            .store
            .find_refresh_token(refresh_token)?
            .ok_or(AuthError::Unauthorized)?;
        if record.revoked {
            return Err(AuthError::Unauthorized);
        }

        record.revoked = true;
        self.store.save_refresh_token(&record)?;

        for mut access in self.store.active_access_tokens(record.account_id)? {
            if access.device_info == record.device_info {
                access.revoked = true;
                self.store.save_access_token(&access)?;
            }
        }

        Ok(())
    }

    /// Revoke every credential of the device behind a refresh token.
    ///
    /// Like [`Self::logout`], but matching rows of both kinds are revoked,
    /// the presented refresh token included. The matched fingerprint is the
    /// one stored on the refresh row, so the device can be logged out from
    /// anywhere its refresh token is held.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token fails to decode, is unknown, revoked, or
    /// past its stored expiry; `Storage` on store failure.
    pub fn logout_device(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.codec
            .decode(refresh_token)
            .ok_or(AuthError::Unauthorized)?;

        let record = self
            .store
            .find_refresh_token(refresh_token)?
            .ok_or(AuthError::Unauthorized)?;
        if record.revoked || Utc::now() > record.expires_at {
            return Err(AuthError::Unauthorized);
        }

        for mut access in self.store.active_access_tokens(record.account_id)? {
            if access.device_info == record.device_info {
                access.revoked = true;
                self.store.save_access_token(&access)?;
            }
        }
        for mut refresh in self.store.active_refresh_tokens(record.account_id)? {
            if refresh.device_info == record.device_info {
                refresh.revoked = true;
                self.store.save_refresh_token(&refresh)?;
            }
        }

        Ok(())
    }

    /// Revoke every credential of both kinds owned by the account.
    ///
    /// # Errors
    ///
    /// `Storage` on store failure.
    pub fn logout_all(&self, account_id: i64) -> Result<(), AuthError> {
        self.store.revoke_all_for_account(account_id)?;
        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Resolve an access token to its ACTIVE row.
    ///
    /// The stored expiry is authoritative: it is rechecked against the
    /// current time regardless of the expiry embedded in the signed payload.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token fails to decode, is unknown, revoked, or
    /// past its stored expiry; `Storage` on store failure.
    pub fn authenticate(&self, access_token: &str) -> Result<AccessToken, AuthError> {
        self.codec
            .decode(access_token)
            .ok_or(AuthError::Unauthorized)?;

        let record = self
            .store
            .find_access_token(access_token)?
            .ok_or(AuthError::Unauthorized)?;
        if record.revoked || Utc::now() > record.expires_at {
            return Err(AuthError::Unauthorized);
        }

        Ok(record)
    }

    /// Whether an access token is currently usable.
    #[must_use]
    pub fn validate(&self, access_token: &str) -> bool {
        self.authenticate(access_token).is_ok()
    }

    // =========================================================================
    // Account and device views
    // =========================================================================

    /// List the account's live devices, one entry per active access token,
    /// in store order.
    ///
    /// # Errors
    ///
    /// `Storage` on store failure.
    pub fn list_devices(&self, account_id: i64) -> Result<Vec<DeviceEntry>, AuthError> {
        let devices = self
            .store
            .active_access_tokens(account_id)?
            .into_iter()
            .map(|token| {
                let (device_info, ip) = split_fingerprint(&token.device_info);
                DeviceEntry {
                    device_info: device_info.to_string(),
                    ip: ip.to_string(),
                    last_login: token.created_at,
                }
            })
            .collect();
        Ok(devices)
    }

    /// Look up the account behind an authenticated request.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the account no longer exists; `Storage` on store
    /// failure.
    pub fn account(&self, account_id: i64) -> Result<Account, AuthError> {
        self.store
            .find_account_by_id(account_id)?
            .ok_or(AuthError::Unauthorized)
    }
}
