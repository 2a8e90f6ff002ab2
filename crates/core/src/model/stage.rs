use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Monthly milestone under an objective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub id: i64,
    pub owner: UserId,
    pub goal_id: i64,
    pub title: String,
    /// 1..=12
    pub month: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

/// Weekly target under a stage. `week_start` is always a Monday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekTarget {
    pub id: i64,
    pub owner: UserId,
    pub stage_id: i64,
    pub title: String,
    pub week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
}
