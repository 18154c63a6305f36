//! Session store: the persistence contract for accounts and token rows
//!
//! The lifecycle manager holds the store as `Arc<dyn SessionStore>` and owns
//! no state of its own; the store is the sole point of mutual exclusion
//! between concurrent requests. Nothing is cached — every check round-trips
//! so that a revocation written by one request is visible to the next.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::models::{AccessToken, Account, RefreshToken};

/// A store operation error. Always surfaced to the caller, never swallowed.
#[derive(Debug, Error)]
#[error("storage failure: {0}")]
pub struct StoreError(pub String);

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self(err.to_string())
    }
}

/// Persistence operations required by the session lifecycle.
///
/// All operations are synchronous; token rows are keyed by token string and
/// by `(account_id, device_info)`. Saves upsert by token string and are used
/// both for creation and for flipping the revoked flag.
pub trait SessionStore: Send + Sync {
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Create an account with a store-assigned id. Fails on a duplicate email.
    fn create_account(&self, name: &str, email: &str) -> Result<Account, StoreError>;

    fn save_access_token(&self, token: &AccessToken) -> Result<(), StoreError>;

    fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError>;

    fn find_access_token(&self, token: &str) -> Result<Option<AccessToken>, StoreError>;

    fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Non-revoked access rows owned by the account, in store order.
    fn active_access_tokens(&self, account_id: i64) -> Result<Vec<AccessToken>, StoreError>;

    /// Non-revoked refresh rows owned by the account, in store order.
    fn active_refresh_tokens(&self, account_id: i64) -> Result<Vec<RefreshToken>, StoreError>;

    /// Bulk-revoke every token of both kinds owned by the account.
    fn revoke_all_for_account(&self, account_id: i64) -> Result<(), StoreError>;
}
