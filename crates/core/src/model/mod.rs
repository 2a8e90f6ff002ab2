//! Record types for every store partition.
//!
//! Each partition has one explicit type with required and optional fields
//! declared up front; the storage crate validates rows against them.

mod category;
mod inbox;
mod okr;
mod settings;
mod stage;
mod task;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use category::Category;
pub use inbox::{InboxNote, NoteRevision};
pub use okr::{DueRevision, KeyResult, Objective, OkrBranch, Quarter, average_progress};
pub use settings::{DailyStat, KnownChat, Setting};
pub use stage::{Stage, WeekTarget};
pub use task::{NewTask, Task, TaskLevel, TaskPatch, TaskRevision, TaskStatus};

/// Chat user identifier that scopes every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
