use chrono::{NaiveDate, Utc};
use planbot_core::{NewTask, Task, TaskLevel, TaskPatch, TaskRevision, TaskStatus, UserId};
use rusqlite::{OptionalExtension as _, Row, params};

use super::{
    Storage, format_date, format_ts, get_conn, log_row_error, parse_date, parse_enum, parse_fixed,
    parse_json, parse_utc,
};
use crate::error::{Result, StorageError};

const TASK_COLUMNS: &str = "id, owner, text, due, level, done, status, start_ts, end_ts, \
     duration_minutes, goal_id, kr_id, category_id, history, created_at";

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let start: Option<String> = row.get(7)?;
    let end: Option<String> = row.get(8)?;
    Ok(Task {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        text: row.get(2)?,
        due: parse_date(3, &row.get::<_, String>(3)?)?,
        level: parse_enum(4, &row.get::<_, String>(4)?)?,
        done: row.get(5)?,
        status: parse_enum(6, &row.get::<_, String>(6)?)?,
        start_ts: start.as_deref().map(|s| parse_fixed(7, s)).transpose()?,
        end_ts: end.as_deref().map(|s| parse_fixed(8, s)).transpose()?,
        duration_minutes: row.get(9)?,
        goal_id: row.get(10)?,
        kr_id: row.get(11)?,
        category_id: row.get(12)?,
        history: parse_json(13, &row.get::<_, String>(13)?)?,
        created_at: parse_utc(14, &row.get::<_, String>(14)?)?,
    })
}

impl Storage {
    /// Insert a task and return the stored record.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn insert_task(&self, task: &NewTask) -> Result<Task> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO tasks
               (owner, text, due, level, done, status, start_ts, end_ts, duration_minutes,
                goal_id, kr_id, category_id, history, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, '[]', ?13)",
            params![
                task.owner.0,
                task.text,
                format_date(task.due),
                task.level.as_str(),
                task.done,
                task.status.as_str(),
                task.start_ts.as_ref().map(format_ts),
                task.end_ts.as_ref().map(format_ts),
                task.duration_minutes,
                task.goal_id,
                task.kr_id,
                task.category_id,
                format_ts(&Utc::now()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);
        tracing::debug!(owner = %task.owner, id, level = %task.level, "Task inserted");
        self.require_task(task.owner, id)
    }

    /// Get task by ID.
    ///
    /// # Errors
    /// Returns error if database query fails or the row is corrupt.
    pub fn get_task(&self, owner: UserId, id: i64) -> Result<Option<Task>> {
        let conn = get_conn(&self.pool)?;
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner = ?2"),
                params![id, owner.0],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Like [`Storage::get_task`] but a missing row is `StorageError::NotFound`.
    ///
    /// # Errors
    /// Returns error if the task does not exist for this owner or the query fails.
    pub fn require_task(&self, owner: UserId, id: i64) -> Result<Task> {
        self.get_task(owner, id)?.ok_or(StorageError::NotFound { entity: "task", id })
    }

    /// Tasks of one level due on `due`, in insertion order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn tasks_due(&self, owner: UserId, due: NaiveDate, level: TaskLevel) -> Result<Vec<Task>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner = ?1 AND due = ?2 AND level = ?3 ORDER BY id"
        ))?;
        let tasks = stmt
            .query_map(params![owner.0, format_date(due), level.as_str()], row_to_task)?
            .filter_map(log_row_error)
            .collect();
        Ok(tasks)
    }

    /// Tasks of any level due within `[from, to]`, in insertion order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn tasks_between(&self, owner: UserId, from: NaiveDate, to: NaiveDate) -> Result<Vec<Task>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner = ?1 AND due >= ?2 AND due <= ?3 ORDER BY id"
        ))?;
        let tasks = stmt
            .query_map(params![owner.0, format_date(from), format_date(to)], row_to_task)?
            .filter_map(log_row_error)
            .collect();
        Ok(tasks)
    }

    /// Day tasks due on `due` that reference `category_id`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn tasks_by_category(&self, owner: UserId, category_id: i64, due: NaiveDate) -> Result<Vec<Task>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
               WHERE owner = ?1 AND category_id = ?2 AND due = ?3 AND level = ?4 ORDER BY id"
        ))?;
        let tasks = stmt
            .query_map(params![owner.0, category_id, format_date(due), TaskLevel::Day.as_str()], row_to_task)?
            .filter_map(log_row_error)
            .collect();
        Ok(tasks)
    }

    /// Every task of the owner, in insertion order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn all_tasks(&self, owner: UserId) -> Result<Vec<Task>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner = ?1 ORDER BY id"))?;
        let tasks = stmt.query_map(params![owner.0], row_to_task)?.filter_map(log_row_error).collect();
        Ok(tasks)
    }

    /// Apply `patch`, appending the previous snapshot to the task history.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown task, or a database error.
    pub fn update_task(&self, owner: UserId, id: i64, patch: &TaskPatch) -> Result<Task> {
        let mut task = self.require_task(owner, id)?;
        if patch.is_empty() {
            return Ok(task);
        }
        let mut history: Vec<TaskRevision> = std::mem::take(&mut task.history);
        history.push(task.snapshot(Utc::now()));
        if let Some(text) = &patch.text {
            task.text.clone_from(text);
        }
        task.goal_id = patch.goal_id.or(task.goal_id);
        task.kr_id = patch.kr_id.or(task.kr_id);
        task.category_id = patch.category_id.or(task.category_id);

        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE tasks SET text = ?1, goal_id = ?2, kr_id = ?3, category_id = ?4, history = ?5
               WHERE id = ?6 AND owner = ?7",
            params![
                task.text,
                task.goal_id,
                task.kr_id,
                task.category_id,
                serde_json::to_string(&history)?,
                id,
                owner.0
            ],
        )?;
        task.history = history;
        Ok(task)
    }

    /// Flip the `done` flag and return the updated task. `status` is left untouched.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown task, or a database error.
    pub fn toggle_task_done(&self, owner: UserId, id: i64) -> Result<Task> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE tasks SET done = NOT done WHERE id = ?1 AND owner = ?2",
            params![id, owner.0],
        )?;
        drop(conn);
        if changed == 0 {
            return Err(StorageError::NotFound { entity: "task", id });
        }
        self.require_task(owner, id)
    }

    /// Set the lifecycle status. `done` is left untouched.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown task, or a database error.
    pub fn set_task_status(&self, owner: UserId, id: i64, status: TaskStatus) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2 AND owner = ?3",
            params![status.as_str(), id, owner.0],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    /// Move a task to another due date and planning level.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown task, or a database error.
    pub fn reschedule_task(&self, owner: UserId, id: i64, due: NaiveDate, level: TaskLevel) -> Result<Task> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE tasks SET due = ?1, level = ?2 WHERE id = ?3 AND owner = ?4",
            params![format_date(due), level.as_str(), id, owner.0],
        )?;
        drop(conn);
        if changed == 0 {
            return Err(StorageError::NotFound { entity: "task", id });
        }
        self.require_task(owner, id)
    }

    /// Move every open week task due `from` to `to`; returns how many moved.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn move_open_week_tasks(&self, owner: UserId, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        let moved = conn.execute(
            "UPDATE tasks SET due = ?1 WHERE owner = ?2 AND level = 'week' AND due = ?3 AND done = 0",
            params![format_date(to), owner.0, format_date(from)],
        )?;
        Ok(moved)
    }
}
