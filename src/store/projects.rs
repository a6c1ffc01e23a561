//! Project rows: per-owner-unique names, rename/soft-delete, time totals.

use super::{epoch_secs, is_constraint_violation, Store};
use crate::error::ApiError;
use rusqlite::params;
use serde::Serialize;

/// One row of the LoadProjects listing: project name plus the summed
/// duration of its live entries, formatted as elapsed time.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    #[serde(rename = "totalTime")]
    pub total_time: String,
}

impl Store {
    /// Insert a project for an owner. The partial unique index on live
    /// (owner, name) pairs is the atomic duplicate check.
    pub fn create_project(&self, owner: i64, name: &str) -> Result<i64, ApiError> {
        let conn = self.conn()?;
        let result = conn.execute(
            "INSERT INTO projects (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![owner, name, epoch_secs()],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Err(ApiError::Conflict(
                "a project with this name already exists".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Id of the live project holding (owner, name), if any. Used for audit
    /// attribution of duplicate rejections and for entry parent resolution.
    pub fn find_live_project_id(&self, owner: i64, name: &str) -> Result<Option<i64>, ApiError> {
        let conn = self.conn()?;
        let row = conn.query_row(
            "SELECT id FROM projects
             WHERE user_id = ?1 AND name = ?2 AND is_deleted = 0",
            params![owner, name],
            |row| row.get(0),
        );
        match row {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Rename and/or soft-delete the live project matched by (owner,
    /// old_name). Returns the row id. A rename colliding with another live
    /// project of the same owner surfaces as `Conflict` from the index.
    pub fn update_project(
        &self,
        owner: i64,
        old_name: &str,
        new_name: &str,
        deleted: bool,
    ) -> Result<i64, ApiError> {
        let id = self
            .find_live_project_id(owner, old_name)?
            .ok_or_else(|| ApiError::NotFound("no such project".into()))?;

        let conn = self.conn()?;
        let result = conn.execute(
            "UPDATE projects SET name = ?1, is_deleted = ?2
             WHERE id = ?3 AND is_deleted = 0",
            params![new_name, deleted, id],
        );
        match result {
            Ok(0) => Err(ApiError::NotFound("no such project".into())),
            Ok(_) => Ok(id),
            Err(e) if is_constraint_violation(&e) => Err(ApiError::Conflict(
                "a project with this name already exists".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Every live project of an owner with the summed duration of its live
    /// entries. LEFT JOIN so projects with no entries report zero rather
    /// than dropping out.
    pub fn load_projects(&self, owner: i64) -> Result<Vec<ProjectSummary>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.name,
                    COALESCE(SUM(e.end_time - e.start_time), 0)
             FROM projects p
             LEFT JOIN entries e
                    ON e.project_id = p.id AND e.is_deleted = 0
             WHERE p.user_id = ?1 AND p.is_deleted = 0
             GROUP BY p.id
             ORDER BY p.name",
        )?;
        let projects = stmt
            .query_map(params![owner], |row| {
                let name: String = row.get(0)?;
                let total_secs: i64 = row.get(1)?;
                Ok(ProjectSummary {
                    name,
                    total_time: format_elapsed(total_secs),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }
}

/// Format a duration in seconds as "HH:MM:SS" (hours unbounded).
pub(crate) fn format_elapsed(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
