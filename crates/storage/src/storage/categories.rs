use chrono::Utc;
use planbot_core::{Category, UserId};
use rusqlite::{OptionalExtension as _, Row, params};

use super::{Storage, format_ts, get_conn, log_row_error, parse_utc};
use crate::error::Result;

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        owner: UserId(row.get(1)?),
        title: row.get(2)?,
        objective_id: row.get(3)?,
        created_at: parse_utc(4, &row.get::<_, String>(4)?)?,
    })
}

impl Storage {
    /// Add a life-priority category, optionally linked to an objective.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn insert_category(&self, owner: UserId, title: &str, objective_id: Option<i64>) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO categories (owner, title, objective_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![owner.0, title, objective_id, format_ts(&Utc::now())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_category(&self, owner: UserId, id: i64) -> Result<Option<Category>> {
        let conn = get_conn(&self.pool)?;
        let category = conn
            .query_row(
                "SELECT id, owner, title, objective_id, created_at FROM categories WHERE id = ?1 AND owner = ?2",
                params![id, owner.0],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_categories(&self, owner: UserId) -> Result<Vec<Category>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, title, objective_id, created_at FROM categories WHERE owner = ?1 ORDER BY id",
        )?;
        let categories =
            stmt.query_map(params![owner.0], row_to_category)?.filter_map(log_row_error).collect();
        Ok(categories)
    }
}
