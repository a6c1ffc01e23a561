//! Append-only audit log.
//!
//! Every state-changing or security-relevant operation is recorded — for
//! both outcomes, so rejected duplicates, failed logins, and policy
//! rejections leave a trail. Writes are best-effort: a logging fault is
//! reported to the operational log and never surfaces to the caller or
//! delays the response.

use super::Store;
use crate::error::ApiError;
use chrono::Utc;
use rusqlite::params;
use serde::Serialize;

/// One audit row, as exposed by the operator-only `GET /logs` surface.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub id: i64,
    pub date_logged: String,
    pub email: String,
    pub operation: String,
    pub target_table: String,
    pub target_id: Option<i64>,
    pub success: bool,
}

impl Store {
    /// Append one audit row. Timestamp is store-assigned.
    pub fn append_log(
        &self,
        email: &str,
        operation: &str,
        target_table: &str,
        target_id: Option<i64>,
        success: bool,
    ) -> Result<(), ApiError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO logs (date_logged, email, operation, target_table, target_id, success)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Utc::now().to_rfc3339(),
                email,
                operation,
                target_table,
                target_id,
                success
            ],
        )?;
        Ok(())
    }

    /// Full audit trail, newest first.
    pub fn list_logs(&self) -> Result<Vec<AuditRecord>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, date_logged, email, operation, target_table, target_id, success
             FROM logs ORDER BY id DESC",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(AuditRecord {
                    id: row.get(0)?,
                    date_logged: row.get(1)?,
                    email: row.get(2)?,
                    operation: row.get(3)?,
                    target_table: row.get(4)?,
                    target_id: row.get(5)?,
                    success: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Fire-and-forget audit recorder for the request path. The write runs on
/// the blocking pool after the handler has already produced its response
/// outcome; failures are downgraded to an operational warning.
#[derive(Clone)]
pub struct AuditLogger {
    store: Store,
}

impl AuditLogger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn record(
        &self,
        email: &str,
        operation: &'static str,
        target_table: &'static str,
        target_id: Option<i64>,
        success: bool,
    ) {
        let store = self.store.clone();
        let email = email.to_owned();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.append_log(&email, operation, target_table, target_id, success)
            {
                tracing::warn!(
                    error = %e,
                    operation,
                    target_table,
                    "audit log write failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::test_store;

    #[test]
    fn append_and_list_newest_first() {
        let (_tmp, store) = test_store();

        store
            .append_log("a@x.com", "register", "users", Some(1), true)
            .unwrap();
        store
            .append_log("b@x.com", "login", "users", None, false)
            .unwrap();

        let logs = store.list_logs().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].operation, "login");
        assert_eq!(logs[0].target_id, None);
        assert!(!logs[0].success);
        assert_eq!(logs[1].operation, "register");
        assert_eq!(logs[1].target_id, Some(1));
        assert!(logs[1].success);
    }

    #[test]
    fn rejections_are_recorded_alongside_successes() {
        let (_tmp, store) = test_store();

        store
            .append_log("a@x.com", "createProject", "projects", Some(7), false)
            .unwrap();
        let logs = store.list_logs().unwrap();
        assert_eq!(logs[0].target_id, Some(7));
        assert!(!logs[0].success);
    }

    #[tokio::test]
    async fn recorder_is_best_effort() {
        let (_tmp, store) = test_store();
        let audit = super::AuditLogger::new(store.clone());

        audit.record("a@x.com", "register", "users", Some(1), true);

        // The write is async; poll briefly for it to land.
        for _ in 0..50 {
            if !store.list_logs().unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("audit record never landed");
    }
}
