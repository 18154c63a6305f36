//! In-memory session store
//!
//! Mirrors the SQLite layout with maps keyed the same way the tables are.
//! Used by the test suites and usable for ephemeral deployments; rows live
//! for the lifetime of the process.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::{AccessToken, Account, RefreshToken};
use crate::store::{SessionStore, StoreError};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    next_account_id: i64,
    access: HashMap<String, AccessToken>,
    refresh: HashMap<String, RefreshToken>,
}

/// Map-backed store with the same contract as [`super::SqliteStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.accounts.iter().find(|a| a.email == email).cloned())
    }

    fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read();
        Ok(inner.accounts.iter().find(|a| a.id == id).cloned())
    }

    fn create_account(&self, name: &str, email: &str) -> Result<Account, StoreError> {
        let mut inner = self.inner.write();
        if inner.accounts.iter().any(|a| a.email == email) {
            return Err(StoreError(format!("account email already exists: {email}")));
        }

        inner.next_account_id += 1;
        let account = Account {
            id: inner.next_account_id,
            name: name.to_string(),
            email: email.to_string(),
        };
        inner.accounts.push(account.clone());
        Ok(account)
    }

    fn save_access_token(&self, token: &AccessToken) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.access.insert(token.token.clone(), token.clone());
        Ok(())
    }

    fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.refresh.insert(token.token.clone(), token.clone());
        Ok(())
    }

    fn find_access_token(&self, token: &str) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.inner.read().access.get(token).cloned())
    }

    fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.inner.read().refresh.get(token).cloned())
    }

    fn active_access_tokens(&self, account_id: i64) -> Result<Vec<AccessToken>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .access
            .values()
            .filter(|t| t.account_id == account_id && !t.revoked)
            .cloned()
            .collect())
    }

    fn active_refresh_tokens(&self, account_id: i64) -> Result<Vec<RefreshToken>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .refresh
            .values()
            .filter(|t| t.account_id == account_id && !t.revoked)
            .cloned()
            .collect())
    }

    fn revoke_all_for_account(&self, account_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        for token in inner.access.values_mut().filter(|t| t.account_id == account_id) {
            token.revoked = true;
        }
        for token in inner.refresh.values_mut().filter(|t| t.account_id == account_id) {
            token.revoked = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn access_row(account_id: i64, token: &str, device_info: &str) -> AccessToken {
        let now = Utc::now();
        AccessToken {
            account_id,
            token: token.to_string(),
            device_info: device_info.to_string(),
            created_at: now,
            expires_at: now + Duration::hours(1),
            revoked: false,
        }
    }

    #[test]
    fn test_account_creation_and_lookup() {
        let store = MemoryStore::new();
        let account = store.create_account("A", "a@x.com").unwrap();
        assert_eq!(account.id, 1);

        let by_email = store.find_account_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email, account);
        let by_id = store.find_account_by_id(account.id).unwrap().unwrap();
        assert_eq!(by_id, account);
        assert!(store.find_account_by_email("b@x.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_account("A", "a@x.com").unwrap();
        assert!(store.create_account("B", "a@x.com").is_err());
    }

    #[test]
    fn test_save_is_upsert() {
        let store = MemoryStore::new();
        let mut row = access_row(1, "tok", "UA1|1.2.3.4");
        store.save_access_token(&row).unwrap();

        row.revoked = true;
        store.save_access_token(&row).unwrap();

        let found = store.find_access_token("tok").unwrap().unwrap();
        assert!(found.revoked);
    }

    #[test]
    fn test_active_listing_skips_revoked_and_other_accounts() {
        let store = MemoryStore::new();
        store.save_access_token(&access_row(1, "live", "UA1|1.2.3.4")).unwrap();
        let mut dead = access_row(1, "dead", "UA1|1.2.3.4");
        dead.revoked = true;
        store.save_access_token(&dead).unwrap();
        store.save_access_token(&access_row(2, "other", "UA2|5.6.7.8")).unwrap();

        let active = store.active_access_tokens(1).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].token, "live");
    }

    #[test]
    fn test_revoke_all_for_account() {
        let store = MemoryStore::new();
        store.save_access_token(&access_row(1, "a1", "UA1|1.2.3.4")).unwrap();
        store.save_access_token(&access_row(1, "a2", "UA2|5.6.7.8")).unwrap();
        store.save_access_token(&access_row(2, "kept", "UA3|9.9.9.9")).unwrap();

        store.revoke_all_for_account(1).unwrap();

        assert!(store.active_access_tokens(1).unwrap().is_empty());
        assert_eq!(store.active_access_tokens(2).unwrap().len(), 1);
    }
}
