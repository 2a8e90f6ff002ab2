use planbot_core::{
    Category, DailyStat, InboxNote, OkrBranch, Setting, Stage, Task, UserId, WeekTarget,
};
use rusqlite::params;
use serde::Serialize;

use super::{Storage, get_conn};
use crate::error::Result;

/// Partitions wiped by [`Storage::reset_owner`]. Stats, settings and known chats survive.
const RESET_TABLES: [&str; 7] =
    ["objectives", "key_results", "tasks", "categories", "inbox", "stages", "weeks"];

/// Every record of one owner, for `planbot export`.
#[derive(Debug, Clone, Serialize)]
pub struct Export {
    pub owner: UserId,
    pub okr: Vec<OkrBranch>,
    pub tasks: Vec<Task>,
    pub inbox: Vec<InboxNote>,
    pub categories: Vec<Category>,
    pub stages: Vec<Stage>,
    pub weeks: Vec<WeekTarget>,
    pub stats: Vec<DailyStat>,
    pub settings: Vec<Setting>,
}

impl Storage {
    /// Delete the owner's planning data in one transaction; returns removed row count.
    ///
    /// # Errors
    /// Returns error if any delete fails; nothing is removed in that case.
    pub fn reset_owner(&self, owner: UserId) -> Result<usize> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let mut removed = 0;
        for table in RESET_TABLES {
            removed += tx.execute(&format!("DELETE FROM {table} WHERE owner = ?1"), params![owner.0])?;
        }
        tx.commit()?;
        tracing::info!(%owner, removed, "Owner data reset");
        Ok(removed)
    }

    /// Collect every partition of one owner.
    ///
    /// # Errors
    /// Returns error if any query fails.
    pub fn export(&self, owner: UserId) -> Result<Export> {
        Ok(Export {
            owner,
            okr: self.okr_tree(owner)?,
            tasks: self.all_tasks(owner)?,
            inbox: self.list_notes(owner, true)?,
            categories: self.list_categories(owner)?,
            stages: self.list_stages(owner)?,
            weeks: self.list_week_targets(owner)?,
            stats: self.list_daily_stats(owner)?,
            settings: self.list_settings(owner)?,
        })
    }
}
