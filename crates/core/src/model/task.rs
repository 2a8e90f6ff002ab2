use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::error::CoreError;

/// Planning horizon a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskLevel {
    Day,
    Week,
    Month,
}

impl TaskLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for TaskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(CoreError::InvalidInput(format!("unknown task level: {s}"))),
        }
    }
}

/// Lifecycle marker set by the start/end reminders.
///
/// Independent of [`Task::done`]: the two are written by different actions
/// and are allowed to disagree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Plan,
    Started,
    Done,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Plan => "plan",
            Self::Started => "started",
            Self::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Self::Plan),
            "started" => Ok(Self::Started),
            "done" => Ok(Self::Done),
            _ => Err(CoreError::InvalidInput(format!("unknown task status: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub owner: UserId,
    pub text: String,
    pub due: NaiveDate,
    pub level: TaskLevel,
    pub done: bool,
    pub status: TaskStatus,
    pub start_ts: Option<DateTime<FixedOffset>>,
    pub end_ts: Option<DateTime<FixedOffset>>,
    pub duration_minutes: Option<u32>,
    pub goal_id: Option<i64>,
    pub kr_id: Option<i64>,
    pub category_id: Option<i64>,
    pub history: Vec<TaskRevision>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a task taken right before an edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRevision {
    pub text: String,
    pub due: NaiveDate,
    pub level: TaskLevel,
    pub done: bool,
    pub status: TaskStatus,
    pub goal_id: Option<i64>,
    pub kr_id: Option<i64>,
    pub category_id: Option<i64>,
    pub ts: DateTime<Utc>,
}

impl Task {
    #[must_use]
    pub fn snapshot(&self, ts: DateTime<Utc>) -> TaskRevision {
        TaskRevision {
            text: self.text.clone(),
            due: self.due,
            level: self.level,
            done: self.done,
            status: self.status,
            goal_id: self.goal_id,
            kr_id: self.kr_id,
            category_id: self.category_id,
            ts,
        }
    }

    /// `HH:MM–HH:MM`, `HH:MM` when only a start is known, `None` without a start.
    #[must_use]
    pub fn time_span(&self) -> Option<String> {
        let start = self.start_ts?.format("%H:%M").to_string();
        Some(match self.end_ts {
            Some(end) => format!("{start}–{}", end.format("%H:%M")),
            None => start,
        })
    }

    /// Sort key used when listing matches for the secretary.
    #[must_use]
    pub fn schedule_key(&self) -> (NaiveDate, Option<DateTime<FixedOffset>>) {
        (self.due, self.start_ts)
    }
}

/// Insert payload for a task; `id`, `history` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub owner: UserId,
    pub text: String,
    pub due: NaiveDate,
    pub level: TaskLevel,
    pub done: bool,
    pub status: TaskStatus,
    pub start_ts: Option<DateTime<FixedOffset>>,
    pub end_ts: Option<DateTime<FixedOffset>>,
    pub duration_minutes: Option<u32>,
    pub goal_id: Option<i64>,
    pub kr_id: Option<i64>,
    pub category_id: Option<i64>,
}

impl NewTask {
    #[must_use]
    pub fn new(owner: UserId, text: impl Into<String>, due: NaiveDate, level: TaskLevel) -> Self {
        Self {
            owner,
            text: text.into(),
            due,
            level,
            done: false,
            status: TaskStatus::Plan,
            start_ts: None,
            end_ts: None,
            duration_minutes: None,
            goal_id: None,
            kr_id: None,
            category_id: None,
        }
    }

    #[must_use]
    pub const fn with_times(
        mut self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Self {
        self.start_ts = start;
        self.end_ts = end;
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = category_id;
        self
    }

    #[must_use]
    pub const fn with_key_result(mut self, kr_id: i64) -> Self {
        self.kr_id = Some(kr_id);
        self
    }
}

/// Field changes applied by `update_task`; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub goal_id: Option<i64>,
    pub kr_id: Option<i64>,
    pub category_id: Option<i64>,
}

impl TaskPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.goal_id.is_none()
            && self.kr_id.is_none()
            && self.category_id.is_none()
    }
}
