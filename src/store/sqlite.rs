//! SQLite-backed session store
//!
//! Tables:
//! - `accounts`: id, name, email (unique)
//! - `access_tokens`: token (pk), account_id, device_info, created_at, expires_at, revoked
//! - `refresh_tokens`: same shape as `access_tokens`
//!
//! Timestamps are Unix seconds. Revoked rows are kept for audit; nothing here
//! deletes them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{AccessToken, Account, RefreshToken};
use crate::store::{SessionStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS access_tokens (
    token TEXT PRIMARY KEY,
    account_id INTEGER NOT NULL REFERENCES accounts(id),
    device_info TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    revoked INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_access_tokens_account ON access_tokens(account_id);

CREATE TABLE IF NOT EXISTS refresh_tokens (
    token TEXT PRIMARY KEY,
    account_id INTEGER NOT NULL REFERENCES accounts(id),
    device_info TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    revoked INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_refresh_tokens_account ON refresh_tokens(account_id);
";

/// SQLite-backed store. The connection mutex is the store's serialization
/// point; requests hold it only for the duration of a single statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path. `:memory:` is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads + crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_else(Utc::now)
}

fn access_from_row(row: &Row<'_>) -> rusqlite::Result<AccessToken> {
    Ok(AccessToken {
        token: row.get(0)?,
        account_id: row.get(1)?,
        device_info: row.get(2)?,
        created_at: timestamp(row.get(3)?),
        expires_at: timestamp(row.get(4)?),
        revoked: row.get(5)?,
    })
}

fn refresh_from_row(row: &Row<'_>) -> rusqlite::Result<RefreshToken> {
    Ok(RefreshToken {
        token: row.get(0)?,
        account_id: row.get(1)?,
        device_info: row.get(2)?,
        created_at: timestamp(row.get(3)?),
        expires_at: timestamp(row.get(4)?),
        revoked: row.get(5)?,
    })
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

impl SessionStore for SqliteStore {
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                "SELECT id, name, email FROM accounts WHERE email = ?1",
                params![email],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                "SELECT id, name, email FROM accounts WHERE id = ?1",
                params![id],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    fn create_account(&self, name: &str, email: &str) -> Result<Account, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO accounts (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;
        Ok(Account {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    fn save_access_token(&self, token: &AccessToken) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO access_tokens (token, account_id, device_info, created_at, expires_at, revoked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(token) DO UPDATE SET revoked = excluded.revoked",
            params![
                token.token,
                token.account_id,
                token.device_info,
                token.created_at.timestamp(),
                token.expires_at.timestamp(),
                token.revoked,
            ],
        )?;
        Ok(())
    }

    fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO refresh_tokens (token, account_id, device_info, created_at, expires_at, revoked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(token) DO UPDATE SET revoked = excluded.revoked",
            params![
                token.token,
                token.account_id,
                token.device_info,
                token.created_at.timestamp(),
                token.expires_at.timestamp(),
                token.revoked,
            ],
        )?;
        Ok(())
    }

    fn find_access_token(&self, token: &str) -> Result<Option<AccessToken>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT token, account_id, device_info, created_at, expires_at, revoked
                 FROM access_tokens WHERE token = ?1",
                params![token],
                access_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT token, account_id, device_info, created_at, expires_at, revoked
                 FROM refresh_tokens WHERE token = ?1",
                params![token],
                refresh_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn active_access_tokens(&self, account_id: i64) -> Result<Vec<AccessToken>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT token, account_id, device_info, created_at, expires_at, revoked
             FROM access_tokens WHERE account_id = ?1 AND revoked = 0",
        )?;
        let rows = stmt.query_map(params![account_id], access_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    fn active_refresh_tokens(&self, account_id: i64) -> Result<Vec<RefreshToken>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT token, account_id, device_info, created_at, expires_at, revoked
             FROM refresh_tokens WHERE account_id = ?1 AND revoked = 0",
        )?;
        let rows = stmt.query_map(params![account_id], refresh_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    fn revoke_all_for_account(&self, account_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE access_tokens SET revoked = 1 WHERE account_id = ?1",
            params![account_id],
        )?;
        conn.execute(
            "UPDATE refresh_tokens SET revoked = 1 WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_temp() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        (dir, store)
    }

    fn refresh_row(account_id: i64, token: &str, device_info: &str) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            account_id,
            token: token.to_string(),
            device_info: device_info.to_string(),
            created_at: now,
            expires_at: now + Duration::days(30),
            revoked: false,
        }
    }

    #[test]
    fn test_account_roundtrip() {
        let (_dir, store) = open_temp();
        let account = store.create_account("A", "a@x.com").unwrap();

        assert_eq!(store.find_account_by_id(account.id).unwrap().unwrap(), account);
        assert_eq!(
            store.find_account_by_email("a@x.com").unwrap().unwrap(),
            account
        );
        assert!(store.find_account_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_violates_unique_constraint() {
        let (_dir, store) = open_temp();
        store.create_account("A", "a@x.com").unwrap();
        assert!(store.create_account("B", "a@x.com").is_err());
    }

    #[test]
    fn test_token_upsert_flips_revoked_only() {
        let (_dir, store) = open_temp();
        let account = store.create_account("A", "a@x.com").unwrap();

        let mut row = refresh_row(account.id, "tok", "UA1|1.2.3.4");
        store.save_refresh_token(&row).unwrap();
        assert!(!store.find_refresh_token("tok").unwrap().unwrap().revoked);

        row.revoked = true;
        store.save_refresh_token(&row).unwrap();

        let reloaded = store.find_refresh_token("tok").unwrap().unwrap();
        assert!(reloaded.revoked);
        assert_eq!(reloaded.device_info, "UA1|1.2.3.4");
    }

    #[test]
    fn test_timestamps_survive_storage() {
        let (_dir, store) = open_temp();
        let account = store.create_account("A", "a@x.com").unwrap();
        let row = refresh_row(account.id, "tok", "UA1|1.2.3.4");
        store.save_refresh_token(&row).unwrap();

        let reloaded = store.find_refresh_token("tok").unwrap().unwrap();
        assert_eq!(reloaded.created_at.timestamp(), row.created_at.timestamp());
        assert_eq!(reloaded.expires_at.timestamp(), row.expires_at.timestamp());
    }

    #[test]
    fn test_active_listing_and_bulk_revocation() {
        let (_dir, store) = open_temp();
        let account = store.create_account("A", "a@x.com").unwrap();
        let other = store.create_account("B", "b@x.com").unwrap();

        store
            .save_refresh_token(&refresh_row(account.id, "r1", "UA1|1.2.3.4"))
            .unwrap();
        store
            .save_refresh_token(&refresh_row(account.id, "r2", "UA2|5.6.7.8"))
            .unwrap();
        store
            .save_refresh_token(&refresh_row(other.id, "kept", "UA3|9.9.9.9"))
            .unwrap();

        assert_eq!(store.active_refresh_tokens(account.id).unwrap().len(), 2);

        store.revoke_all_for_account(account.id).unwrap();

        assert!(store.active_refresh_tokens(account.id).unwrap().is_empty());
        assert_eq!(store.active_refresh_tokens(other.id).unwrap().len(), 1);
        // revoked rows remain for audit
        assert!(store.find_refresh_token("r1").unwrap().unwrap().revoked);
    }
}
