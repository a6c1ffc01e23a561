//! Account rows: registration, lookup, password rotation, soft delete.

use super::{epoch_secs, is_constraint_violation, Store};
use crate::error::ApiError;
use rusqlite::params;
use serde::Serialize;

/// A live account row.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub session_version: i64,
}

/// Account listing shape for the admin surface (no credential material).
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub email: String,
    pub created_at: i64,
}

impl Store {
    /// Insert a new account. The partial unique index on live emails makes
    /// this the atomic duplicate check; a constraint violation means a
    /// non-deleted account already holds the email.
    pub fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<i64, ApiError> {
        let conn = self.conn()?;
        let result = conn.execute(
            "INSERT INTO users (email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![email, password_hash, salt, epoch_secs()],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Err(ApiError::Conflict(
                "an account with this email already exists".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up the live account holding an email.
    pub fn find_live_account(&self, email: &str) -> Result<Option<Account>, ApiError> {
        let conn = self.conn()?;
        let row = conn.query_row(
            "SELECT id, email, password_hash, salt, session_version
             FROM users WHERE email = ?1 AND is_deleted = 0",
            params![email],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    salt: row.get(3)?,
                    session_version: row.get(4)?,
                })
            },
        );
        match row {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Identity resolution for authenticated requests: the caller's session
    /// assertion must name a live account whose stored session version still
    /// matches. A password change or account deletion makes this miss, which
    /// is the enforcement point for session invalidation.
    pub fn resolve_account_id(
        &self,
        email: &str,
        session_version: i64,
    ) -> Result<Option<i64>, ApiError> {
        let conn = self.conn()?;
        let row = conn.query_row(
            "SELECT id FROM users
             WHERE email = ?1 AND session_version = ?2 AND is_deleted = 0",
            params![email, session_version],
            |row| row.get(0),
        );
        match row {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite an account's credential material and bump its session
    /// version, revoking every outstanding session token. Returns the
    /// account id, or `None` if no live account holds the email.
    pub fn rotate_password(
        &self,
        email: &str,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<Option<i64>, ApiError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users
             SET password_hash = ?1, salt = ?2, session_version = session_version + 1
             WHERE email = ?3 AND is_deleted = 0",
            params![new_hash, new_salt, email],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let id = conn.query_row(
            "SELECT id FROM users WHERE email = ?1 AND is_deleted = 0",
            params![email],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }

    /// Soft-delete an account by id. The email becomes reusable because the
    /// row leaves the live-email index. Returns false if the row was already
    /// deleted or absent.
    pub fn soft_delete_account(&self, account_id: i64) -> Result<bool, ApiError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET is_deleted = 1 WHERE id = ?1 AND is_deleted = 0",
            params![account_id],
        )?;
        Ok(changed > 0)
    }

    /// List all live accounts (admin surface).
    pub fn list_accounts(&self) -> Result<Vec<AccountSummary>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, email, created_at FROM users
             WHERE is_deleted = 0 ORDER BY id",
        )?;
        let accounts = stmt
            .query_map([], |row| {
                Ok(AccountSummary {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::test_store;
    use crate::error::ApiError;

    #[test]
    fn create_and_find_account() {
        let (_tmp, store) = test_store();
        let id = store.create_account("a@x.com", "hash", "salt").unwrap();

        let account = store.find_live_account("a@x.com").unwrap().unwrap();
        assert_eq!(account.id, id);
        assert_eq!(account.session_version, 0);
        assert!(store.find_live_account("b@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_live_email_conflicts() {
        let (_tmp, store) = test_store();
        store.create_account("a@x.com", "h1", "s1").unwrap();

        let err = store.create_account("a@x.com", "h2", "s2").unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn email_reusable_after_soft_delete() {
        let (_tmp, store) = test_store();
        let first = store.create_account("a@x.com", "h1", "s1").unwrap();
        assert!(store.soft_delete_account(first).unwrap());

        let second = store.create_account("a@x.com", "h2", "s2").unwrap();
        assert_ne!(first, second);

        // The live lookup resolves to the new row only.
        let account = store.find_live_account("a@x.com").unwrap().unwrap();
        assert_eq!(account.id, second);
    }

    #[test]
    fn soft_delete_is_idempotent_signal() {
        let (_tmp, store) = test_store();
        let id = store.create_account("a@x.com", "h", "s").unwrap();
        assert!(store.soft_delete_account(id).unwrap());
        assert!(!store.soft_delete_account(id).unwrap());
        assert!(!store.soft_delete_account(9999).unwrap());
    }

    #[test]
    fn identity_resolution_tracks_session_version() {
        let (_tmp, store) = test_store();
        let id = store.create_account("a@x.com", "h", "s").unwrap();

        assert_eq!(store.resolve_account_id("a@x.com", 0).unwrap(), Some(id));

        let rotated = store.rotate_password("a@x.com", "h2", "s2").unwrap();
        assert_eq!(rotated, Some(id));

        // Tokens minted against the old version no longer resolve.
        assert_eq!(store.resolve_account_id("a@x.com", 0).unwrap(), None);
        assert_eq!(store.resolve_account_id("a@x.com", 1).unwrap(), Some(id));
    }

    #[test]
    fn identity_resolution_fails_after_delete() {
        let (_tmp, store) = test_store();
        let id = store.create_account("a@x.com", "h", "s").unwrap();
        store.soft_delete_account(id).unwrap();
        assert_eq!(store.resolve_account_id("a@x.com", 0).unwrap(), None);
    }

    #[test]
    fn rotate_password_on_unknown_email_is_none() {
        let (_tmp, store) = test_store();
        assert_eq!(store.rotate_password("ghost@x.com", "h", "s").unwrap(), None);
    }

    #[test]
    fn list_accounts_excludes_deleted() {
        let (_tmp, store) = test_store();
        let a = store.create_account("a@x.com", "h", "s").unwrap();
        let b = store.create_account("b@x.com", "h", "s").unwrap();
        store.soft_delete_account(a).unwrap();

        let accounts = store.list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, b);
        assert_eq!(accounts[0].email, "b@x.com");
    }
}
