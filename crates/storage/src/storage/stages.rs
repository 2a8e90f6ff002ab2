use chrono::{NaiveDate, Utc};
use planbot_core::{Stage, UserId, WeekTarget};
use rusqlite::{Row, params};

use super::{Storage, format_date, format_ts, get_conn, log_row_error, parse_date, parse_utc};
use crate::error::Result;

const STAGE_COLUMNS: &str = "id, owner, goal_id, title, month, year, created_at";
const WEEK_COLUMNS: &str = "id, owner, stage_id, title, week_start, created_at";

fn row_to_stage(row: &Row<'_>) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        goal_id: row.get(2)?,
        title: row.get(3)?,
        month: row.get(4)?,
        year: row.get(5)?,
        created_at: parse_utc(6, &row.get::<_, String>(6)?)?,
    })
}

fn row_to_week(row: &Row<'_>) -> rusqlite::Result<WeekTarget> {
    Ok(WeekTarget {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        stage_id: row.get(2)?,
        title: row.get(3)?,
        week_start: parse_date(4, &row.get::<_, String>(4)?)?,
        created_at: parse_utc(5, &row.get::<_, String>(5)?)?,
    })
}

impl Storage {
    /// Add a monthly stage for an objective.
    ///
    /// # Errors
    /// Returns `NotFound` when the objective does not belong to the owner, or a database error.
    pub fn insert_stage(&self, owner: UserId, goal_id: i64, title: &str, month: u32, year: i32) -> Result<i64> {
        self.require_objective(owner, goal_id)?;
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO stages (owner, goal_id, title, month, year, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![owner.0, goal_id, title, month, year, format_ts(&Utc::now())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Stages planned for a month, in insertion order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn stages_for_month(&self, owner: UserId, month: u32, year: i32) -> Result<Vec<Stage>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {STAGE_COLUMNS} FROM stages WHERE owner = ?1 AND month = ?2 AND year = ?3 ORDER BY id"
        ))?;
        let stages =
            stmt.query_map(params![owner.0, month, year], row_to_stage)?.filter_map(log_row_error).collect();
        Ok(stages)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_stages(&self, owner: UserId) -> Result<Vec<Stage>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {STAGE_COLUMNS} FROM stages WHERE owner = ?1 ORDER BY id"))?;
        let stages = stmt.query_map(params![owner.0], row_to_stage)?.filter_map(log_row_error).collect();
        Ok(stages)
    }

    /// Add a weekly target under a stage. `week_start` must be a Monday.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn insert_week_target(
        &self,
        owner: UserId,
        stage_id: i64,
        title: &str,
        week_start: NaiveDate,
    ) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO weeks (owner, stage_id, title, week_start, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![owner.0, stage_id, title, format_date(week_start), format_ts(&Utc::now())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Weekly targets of the week starting on `week_start`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn week_targets(&self, owner: UserId, week_start: NaiveDate) -> Result<Vec<WeekTarget>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WEEK_COLUMNS} FROM weeks WHERE owner = ?1 AND week_start = ?2 ORDER BY id"
        ))?;
        let weeks = stmt
            .query_map(params![owner.0, format_date(week_start)], row_to_week)?
            .filter_map(log_row_error)
            .collect();
        Ok(weeks)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_week_targets(&self, owner: UserId) -> Result<Vec<WeekTarget>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {WEEK_COLUMNS} FROM weeks WHERE owner = ?1 ORDER BY id"))?;
        let weeks = stmt.query_map(params![owner.0], row_to_week)?.filter_map(log_row_error).collect();
        Ok(weeks)
    }
}
