use chrono::NaiveDate;
use planbot_core::{DailyStat, UserId};
use rusqlite::{OptionalExtension as _, params};

use super::{Storage, format_date, get_conn, log_row_error, parse_date};
use crate::error::Result;

impl Storage {
    /// Upsert the completion numbers of one day.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn record_daily_stat(&self, stat: &DailyStat) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO stats (owner, date, done, total) VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(owner, date) DO UPDATE SET done = excluded.done, total = excluded.total",
            params![stat.owner.0, format_date(stat.date), stat.done, stat.total],
        )?;
        Ok(())
    }

    /// Stored numbers for a day; zeros when nothing was recorded.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn daily_stat(&self, owner: UserId, date: NaiveDate) -> Result<DailyStat> {
        let conn = get_conn(&self.pool)?;
        let stat = conn
            .query_row(
                "SELECT done, total FROM stats WHERE owner = ?1 AND date = ?2",
                params![owner.0, format_date(date)],
                |row| Ok(DailyStat { owner, date, done: row.get(0)?, total: row.get(1)? }),
            )
            .optional()?;
        Ok(stat.unwrap_or_else(|| DailyStat::empty(owner, date)))
    }

    /// Every recorded day, oldest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_daily_stats(&self, owner: UserId) -> Result<Vec<DailyStat>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT date, done, total FROM stats WHERE owner = ?1 ORDER BY date")?;
        let stats = stmt
            .query_map(params![owner.0], |row| {
                Ok(DailyStat {
                    owner,
                    date: parse_date(0, &row.get::<_, String>(0)?)?,
                    done: row.get(1)?,
                    total: row.get(2)?,
                })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(stats)
    }
}
