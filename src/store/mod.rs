//! Pooled SQLite datastore with soft-delete semantics.
//!
//! Tables:
//! - `users`: email, password hash + salt, session version, deleted flag
//! - `projects`: owner, name, deleted flag
//! - `entries`: owner, per-owner local id, parent project, summary, span
//! - `logs`: append-only audit trail
//!
//! Uniqueness among *live* rows is enforced with partial unique indexes, so
//! duplicate checks are a single atomic conditional write rather than
//! look-then-insert; a store-level constraint violation is translated into
//! the `Conflict` taxonomy. Soft-deleted rows fall out of the indexes, which
//! is what makes an email or project name reusable after deletion.

pub mod accounts;
pub mod audit;
pub mod entries;
pub mod projects;

use crate::error::ApiError;
use anyhow::{Context, Result};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;

pub use audit::AuditLogger;

type SqlitePool = r2d2::Pool<SqliteConnectionManager>;
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Handle to the pooled datastore. Cheap to clone; each request checks out
/// one connection for its full duration and `Drop` returns it to the pool on
/// every exit path.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(db_path: &Path, max_connections: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            // WAL mode for concurrent reads + crash safety
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        let pool = r2d2::Pool::builder()
            .max_size(max_connections.max(1))
            .build(manager)
            .with_context(|| format!("failed to open database {}", db_path.display()))?;

        let store = Self { pool };
        let conn = store.conn().map_err(|e| anyhow::anyhow!("{e}"))?;
        init_schema(&conn)?;
        Ok(store)
    }

    /// Check out a connection for the current request.
    pub(crate) fn conn(&self) -> std::result::Result<PooledConn, ApiError> {
        Ok(self.pool.get()?)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            email           TEXT NOT NULL,
            password_hash   TEXT NOT NULL,
            salt            TEXT NOT NULL,
            session_version INTEGER NOT NULL DEFAULT 0,
            is_deleted      INTEGER NOT NULL DEFAULT 0,
            created_at      INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_live_email
            ON users(email) WHERE is_deleted = 0;

        CREATE TABLE IF NOT EXISTS projects (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL REFERENCES users(id),
            name       TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_live_owner_name
            ON projects(user_id, name) WHERE is_deleted = 0;

        CREATE TABLE IF NOT EXISTS entries (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL REFERENCES users(id),
            local_id   TEXT NOT NULL,
            project_id INTEGER NOT NULL REFERENCES projects(id),
            summary    TEXT NOT NULL,
            start_time INTEGER NOT NULL,
            end_time   INTEGER NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_live_owner_local
            ON entries(user_id, local_id) WHERE is_deleted = 0;
        CREATE INDEX IF NOT EXISTS idx_entries_owner ON entries(user_id);
        CREATE INDEX IF NOT EXISTS idx_entries_project ON entries(project_id);

        CREATE TABLE IF NOT EXISTS logs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            date_logged  TEXT NOT NULL,
            email        TEXT NOT NULL,
            operation    TEXT NOT NULL,
            target_table TEXT NOT NULL,
            target_id    INTEGER,
            success      INTEGER NOT NULL
        );",
    )?;
    Ok(())
}

/// Whether a rusqlite error is a uniqueness-constraint violation (the
/// authoritative duplicate signal under concurrent writers).
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Current Unix epoch in seconds, for `created_at` columns.
pub(crate) fn epoch_secs() -> i64 {
    crate::auth::token::epoch_secs()
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_initializes_schema_and_is_reopenable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("timewise.db");

        let store = Store::open(&path, 2).unwrap();
        let conn = store.conn().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('users', 'projects', 'entries', 'logs')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
        drop(conn);
        drop(store);

        // schema init is idempotent on an existing file
        Store::open(&path, 2).unwrap();
    }
}
