use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Per-owner preference, one row per `(owner, key)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    pub owner: UserId,
    pub key: String,
    pub value: serde_json::Value,
}

/// Last chat an owner talked from; used to restore daily reminders after restart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnownChat {
    pub owner: UserId,
    pub chat_id: i64,
}

/// Aggregated completion numbers for one owner and day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStat {
    pub owner: UserId,
    pub date: NaiveDate,
    pub done: u32,
    pub total: u32,
}

impl DailyStat {
    #[must_use]
    pub const fn empty(owner: UserId, date: NaiveDate) -> Self {
        Self { owner, date, done: 0, total: 0 }
    }

    /// Integer percentage of done tasks; 0 for an empty day.
    #[must_use]
    pub const fn percent(&self) -> u32 {
        if self.total == 0 { 0 } else { self.done * 100 / self.total }
    }
}
