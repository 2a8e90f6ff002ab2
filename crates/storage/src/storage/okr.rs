use chrono::Utc;
use planbot_core::progress::clamp_progress;
use planbot_core::{DueDate, DueRevision, KeyResult, Objective, OkrBranch, ProgressChange, Quarter, UserId};
use rusqlite::{OptionalExtension as _, Row, params};

use super::{Storage, format_ts, get_conn, log_row_error, parse_enum, parse_json, parse_utc};
use crate::error::{Result, StorageError};

const OBJECTIVE_COLUMNS: &str = "id, owner, title, due, due_history, created_at";
const KR_COLUMNS: &str = "id, owner, objective_id, title, quarter, progress, pinned, created_at";

fn row_to_objective(row: &Row<'_>) -> rusqlite::Result<Objective> {
    let due: Option<String> = row.get(3)?;
    Ok(Objective {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        title: row.get(2)?,
        due: due.as_deref().map(|s| parse_enum::<DueDate>(3, s)).transpose()?,
        due_history: parse_json(4, &row.get::<_, String>(4)?)?,
        created_at: parse_utc(5, &row.get::<_, String>(5)?)?,
    })
}

fn row_to_key_result(row: &Row<'_>) -> rusqlite::Result<KeyResult> {
    Ok(KeyResult {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        objective_id: row.get(2)?,
        title: row.get(3)?,
        quarter: parse_enum::<Quarter>(4, &row.get::<_, String>(4)?)?,
        progress: row.get(5)?,
        pinned: row.get(6)?,
        created_at: parse_utc(7, &row.get::<_, String>(7)?)?,
    })
}

impl Storage {
    /// Insert an objective.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn insert_objective(&self, owner: UserId, title: &str, due: Option<DueDate>) -> Result<Objective> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO objectives (owner, title, due, due_history, created_at)
               VALUES (?1, ?2, ?3, '[]', ?4)",
            params![owner.0, title, due.map(|d| d.to_string()), format_ts(&Utc::now())],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);
        tracing::debug!(%owner, id, "Objective inserted");
        self.require_objective(owner, id)
    }

    /// # Errors
    /// Returns error if database query fails or the row is corrupt.
    pub fn get_objective(&self, owner: UserId, id: i64) -> Result<Option<Objective>> {
        let conn = get_conn(&self.pool)?;
        let objective = conn
            .query_row(
                &format!("SELECT {OBJECTIVE_COLUMNS} FROM objectives WHERE id = ?1 AND owner = ?2"),
                params![id, owner.0],
                row_to_objective,
            )
            .optional()?;
        Ok(objective)
    }

    /// # Errors
    /// Returns `NotFound` for an unknown objective, or a database error.
    pub fn require_objective(&self, owner: UserId, id: i64) -> Result<Objective> {
        self.get_objective(owner, id)?.ok_or(StorageError::NotFound { entity: "objective", id })
    }

    /// All objectives of the owner, in insertion order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_objectives(&self, owner: UserId) -> Result<Vec<Objective>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBJECTIVE_COLUMNS} FROM objectives WHERE owner = ?1 ORDER BY id"
        ))?;
        let objectives =
            stmt.query_map(params![owner.0], row_to_objective)?.filter_map(log_row_error).collect();
        Ok(objectives)
    }

    /// Set the objective deadline. The previous value goes to `due_history`
    /// only when it actually changes.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown objective, or a database error.
    pub fn set_objective_due(&self, owner: UserId, id: i64, due: DueDate) -> Result<Objective> {
        let mut objective = self.require_objective(owner, id)?;
        if objective.due == Some(due) {
            return Ok(objective);
        }
        objective.due_history.push(DueRevision { ts: Utc::now(), due: objective.due });
        objective.due = Some(due);

        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE objectives SET due = ?1, due_history = ?2 WHERE id = ?3 AND owner = ?4",
            params![due.to_string(), serde_json::to_string(&objective.due_history)?, id, owner.0],
        )?;
        Ok(objective)
    }

    /// Insert a key result under an objective of the same owner.
    ///
    /// # Errors
    /// Returns `NotFound` when the objective does not belong to the owner, or a database error.
    pub fn insert_key_result(
        &self,
        owner: UserId,
        objective_id: i64,
        title: &str,
        quarter: Quarter,
        progress: u8,
    ) -> Result<KeyResult> {
        self.require_objective(owner, objective_id)?;
        let progress = clamp_progress(i32::from(progress));
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO key_results (owner, objective_id, title, quarter, progress, pinned, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![owner.0, objective_id, title, quarter.as_str(), progress, format_ts(&Utc::now())],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);
        self.require_key_result(owner, id)
    }

    /// # Errors
    /// Returns error if database query fails or the row is corrupt.
    pub fn get_key_result(&self, owner: UserId, id: i64) -> Result<Option<KeyResult>> {
        let conn = get_conn(&self.pool)?;
        let kr = conn
            .query_row(
                &format!("SELECT {KR_COLUMNS} FROM key_results WHERE id = ?1 AND owner = ?2"),
                params![id, owner.0],
                row_to_key_result,
            )
            .optional()?;
        Ok(kr)
    }

    /// # Errors
    /// Returns `NotFound` for an unknown key result, or a database error.
    pub fn require_key_result(&self, owner: UserId, id: i64) -> Result<KeyResult> {
        self.get_key_result(owner, id)?.ok_or(StorageError::NotFound { entity: "key result", id })
    }

    /// Key results of an objective, optionally limited to one quarter, in insertion order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn key_results_for(
        &self,
        owner: UserId,
        objective_id: i64,
        quarter: Option<Quarter>,
    ) -> Result<Vec<KeyResult>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {KR_COLUMNS} FROM key_results
               WHERE owner = ?1 AND objective_id = ?2 AND (?3 IS NULL OR quarter = ?3)
               ORDER BY id"
        ))?;
        let krs = stmt
            .query_map(params![owner.0, objective_id, quarter.map(|q| q.as_str())], row_to_key_result)?
            .filter_map(log_row_error)
            .collect();
        Ok(krs)
    }

    /// Apply a progress change, clamped to `0..=100`.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown key result, or a database error.
    pub fn change_kr_progress(&self, owner: UserId, id: i64, change: ProgressChange) -> Result<KeyResult> {
        let mut kr = self.require_key_result(owner, id)?;
        kr.progress = change.apply(kr.progress);
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE key_results SET progress = ?1 WHERE id = ?2 AND owner = ?3",
            params![kr.progress, id, owner.0],
        )?;
        Ok(kr)
    }

    /// Mark a key result as pinned to the planner.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown key result, or a database error.
    pub fn pin_key_result(&self, owner: UserId, id: i64) -> Result<KeyResult> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE key_results SET pinned = 1 WHERE id = ?1 AND owner = ?2",
            params![id, owner.0],
        )?;
        drop(conn);
        if changed == 0 {
            return Err(StorageError::NotFound { entity: "key result", id });
        }
        self.require_key_result(owner, id)
    }

    /// Objectives with their key results.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn okr_tree(&self, owner: UserId) -> Result<Vec<OkrBranch>> {
        self.list_objectives(owner)?
            .into_iter()
            .map(|objective| {
                let key_results = self.key_results_for(owner, objective.id, None)?;
                Ok(OkrBranch { objective, key_results })
            })
            .collect()
    }
}
