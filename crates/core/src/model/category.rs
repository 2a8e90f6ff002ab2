use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Life priority collected during onboarding; tasks may reference one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub owner: UserId,
    pub title: String,
    pub objective_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
