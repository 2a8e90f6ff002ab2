use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Unstructured idea captured from free text, later promoted to a task or objective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboxNote {
    pub id: i64,
    pub owner: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag; archived notes stay in the store.
    pub archived: bool,
    pub history: Vec<NoteRevision>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteRevision {
    pub ts: DateTime<Utc>,
    pub text: String,
}
