//! Entry rows: per-owner local ids, parent project resolution, listings.

use super::{epoch_secs, is_constraint_violation, Store};
use crate::error::ApiError;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::params;
use serde::Serialize;

/// Length of a generated local identifier.
const LOCAL_ID_LEN: usize = 8;

/// Collision-retry bound for local id generation. The partial unique index
/// on live (owner, local_id) pairs is the authoritative backstop; running
/// out of attempts on an 8-char alphanumeric alphabet means something is
/// deeply wrong, so it is fatal rather than an infinite loop.
const MAX_LOCAL_ID_ATTEMPTS: u32 = 16;

/// One row of the LoadEntries listing. `project` is `None` when the parent
/// project has been soft-deleted: the entry itself stays listed, but the
/// dead project no longer lends its name.
#[derive(Debug, Clone, Serialize)]
pub struct EntryRow {
    pub local_id: String,
    pub summary: String,
    pub start_time: i64,
    pub end_time: i64,
    pub project: Option<String>,
}

impl Store {
    /// Insert an entry under the live project named (owner, project_name),
    /// minting a fresh per-owner local id. Returns (row id, local id).
    pub fn create_entry(
        &self,
        owner: i64,
        project_name: &str,
        summary: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<(i64, String), ApiError> {
        let project_id = self
            .find_live_project_id(owner, project_name)?
            .ok_or_else(|| ApiError::NotFound("no such project".into()))?;

        let conn = self.conn()?;
        for _ in 0..MAX_LOCAL_ID_ATTEMPTS {
            let local_id = generate_local_id();
            let result = conn.execute(
                "INSERT INTO entries
                     (user_id, local_id, project_id, summary, start_time, end_time, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    owner,
                    local_id,
                    project_id,
                    summary,
                    start_time,
                    end_time,
                    epoch_secs()
                ],
            );
            match result {
                Ok(_) => return Ok((conn.last_insert_rowid(), local_id)),
                // Collision with this owner's live local ids: draw again.
                Err(e) if is_constraint_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::fatal(anyhow::anyhow!(
            "local id generation exhausted {MAX_LOCAL_ID_ATTEMPTS} attempts for owner {owner}"
        )))
    }

    /// Update the live entry matched by (owner, local_id): summary, span,
    /// parent project (resolved by name), and deleted flag. Returns the
    /// row id.
    pub fn update_entry(
        &self,
        owner: i64,
        local_id: &str,
        summary: &str,
        start_time: i64,
        end_time: i64,
        project_name: &str,
        deleted: bool,
    ) -> Result<i64, ApiError> {
        let project_id = self
            .find_live_project_id(owner, project_name)?
            .ok_or_else(|| ApiError::NotFound("no such project".into()))?;

        let conn = self.conn()?;
        let id: i64 = match conn.query_row(
            "SELECT id FROM entries
             WHERE user_id = ?1 AND local_id = ?2 AND is_deleted = 0",
            params![owner, local_id],
            |row| row.get(0),
        ) {
            Ok(id) => id,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(ApiError::NotFound("no such entry".into()));
            }
            Err(e) => return Err(e.into()),
        };

        conn.execute(
            "UPDATE entries
             SET summary = ?1, start_time = ?2, end_time = ?3,
                 project_id = ?4, is_deleted = ?5
             WHERE id = ?6",
            params![summary, start_time, end_time, project_id, deleted, id],
        )?;
        Ok(id)
    }

    /// Every live entry of an owner, with the parent project name
    /// left-joined (`None` once the project is soft-deleted).
    pub fn load_entries(&self, owner: i64) -> Result<Vec<EntryRow>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT e.local_id, e.summary, e.start_time, e.end_time, p.name
             FROM entries e
             LEFT JOIN projects p
                    ON p.id = e.project_id AND p.is_deleted = 0
             WHERE e.user_id = ?1 AND e.is_deleted = 0
             ORDER BY e.start_time, e.id",
        )?;
        let entries = stmt
            .query_map(params![owner], |row| {
                Ok(EntryRow {
                    local_id: row.get(0)?,
                    summary: row.get(1)?,
                    start_time: row.get(2)?,
                    end_time: row.get(3)?,
                    project: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

/// Draw a fresh fixed-length alphanumeric local id.
fn generate_local_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LOCAL_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_util::test_store;
    use super::*;
    use std::collections::HashSet;

    fn owner_with_project(store: &Store, email: &str, project: &str) -> i64 {
        let id = store.create_account(email, "h", "s").unwrap();
        store.create_project(id, project).unwrap();
        id
    }

    #[test]
    fn create_resolves_parent_by_name() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");

        let (id, local_id) = store.create_entry(alice, "Work", "wrote docs", 0, 60).unwrap();
        assert!(id > 0);
        assert_eq!(local_id.len(), LOCAL_ID_LEN);

        let err = store
            .create_entry(alice, "Ghost", "nope", 0, 60)
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn soft_deleted_parent_rejects_new_entries() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");
        store.update_project(alice, "Work", "Work", true).unwrap();

        let err = store.create_entry(alice, "Work", "s", 0, 60).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn local_ids_distinct_per_owner_under_stress() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");

        let mut seen = HashSet::new();
        for i in 0..100 {
            let (_, local_id) = store
                .create_entry(alice, "Work", &format!("entry {i}"), 0, 60)
                .unwrap();
            assert!(seen.insert(local_id), "duplicate local id for one owner");
        }
    }

    #[test]
    fn update_entry_moves_and_soft_deletes() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");
        store.create_project(alice, "Play").unwrap();

        let (id, local_id) = store.create_entry(alice, "Work", "s", 0, 60).unwrap();

        let updated = store
            .update_entry(alice, &local_id, "s2", 10, 70, "Play", false)
            .unwrap();
        assert_eq!(updated, id);

        let entries = store.load_entries(alice).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].summary, "s2");
        assert_eq!(entries[0].project.as_deref(), Some("Play"));

        store
            .update_entry(alice, &local_id, "s2", 10, 70, "Play", true)
            .unwrap();
        assert!(store.load_entries(alice).unwrap().is_empty());

        // The local id now misses: it belonged to a soft-deleted row.
        let err = store
            .update_entry(alice, &local_id, "s3", 0, 1, "Play", false)
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn load_entries_keeps_orphans_with_null_project() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");

        store.create_entry(alice, "Work", "orphaned", 0, 60).unwrap();
        store.update_project(alice, "Work", "Work", true).unwrap();

        let entries = store.load_entries(alice).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].summary, "orphaned");
        assert_eq!(entries[0].project, None);
    }

    #[test]
    fn entries_are_owner_scoped() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");
        let bob = owner_with_project(&store, "bob@x.com", "Work");

        let (_, alice_local) = store.create_entry(alice, "Work", "mine", 0, 60).unwrap();

        assert!(store.load_entries(bob).unwrap().is_empty());
        let err = store
            .update_entry(bob, &alice_local, "steal", 0, 60, "Work", false)
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn same_local_id_is_allowed_across_owners_but_not_within_one() {
        let (_tmp, store) = test_store();
        let alice = owner_with_project(&store, "alice@x.com", "Work");
        let bob = owner_with_project(&store, "bob@x.com", "Work");

        let insert = |owner: i64, project: &str| {
            let project_id = store.find_live_project_id(owner, project).unwrap().unwrap();
            store.conn().unwrap().execute(
                "INSERT INTO entries
                     (user_id, local_id, project_id, summary, start_time, end_time, created_at)
                 VALUES (?1, 'fixed123', ?2, 's', 0, 60, 0)",
                params![owner, project_id],
            )
        };

        // the uniqueness index is scoped per owner, not global
        insert(alice, "Work").unwrap();
        insert(bob, "Work").unwrap();

        let err = insert(alice, "Work").unwrap_err();
        assert!(is_constraint_violation(&err));

        assert_eq!(store.load_entries(alice).unwrap().len(), 1);
        assert_eq!(store.load_entries(bob).unwrap().len(), 1);
    }

    #[test]
    fn generated_local_ids_are_alphanumeric() {
        for _ in 0..20 {
            let id = generate_local_id();
            assert_eq!(id.len(), LOCAL_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
