//! Per-user pending-input registry.
//!
//! Each user has at most one [`Pending`] value describing what the bot
//! expects next. Handlers take the value out, run the step, and put the
//! successor back, so the lock is never held across an `.await`. Entries
//! live in memory only and are gone after a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveTime;
use planbot_core::{Quarter, UserId};

use crate::dialogue::LifePlanState;

/// The single thing a user is expected to send next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// Life-plan and category onboarding.
    LifePlan(LifePlanState),
    /// Question for the secretary.
    AiQuestion,

    TodoText { category_id: Option<i64> },
    TodoStart { text: String, category_id: Option<i64> },
    TodoDuration { text: String, start: NaiveTime, category_id: Option<i64> },
    EditTask { task_id: i64 },
    WeekText,
    MonthText,

    GoalTitle,
    GoalDue { objective_id: i64 },
    StageTitle { goal_id: i64 },
    /// Title typed, waiting for a month button.
    StageMonth { goal_id: i64, title: String },
    WeekTargetTitle { stage_id: i64 },
    KrTitle { objective_id: i64, quarter: Quarter },
    KrInitialProgress { objective_id: i64, quarter: Quarter, title: String },
    KrProgress { kr_id: i64 },

    InboxText,
    EditNote { note_id: i64 },
    NoteTaskDate { note_id: i64 },
}

impl Pending {
    /// Short label for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LifePlan(_) => "life_plan",
            Self::AiQuestion => "ai_question",
            Self::TodoText { .. } => "todo_text",
            Self::TodoStart { .. } => "todo_start",
            Self::TodoDuration { .. } => "todo_duration",
            Self::EditTask { .. } => "edit_task",
            Self::WeekText => "week_text",
            Self::MonthText => "month_text",
            Self::GoalTitle => "goal_title",
            Self::GoalDue { .. } => "goal_due",
            Self::StageTitle { .. } => "stage_title",
            Self::StageMonth { .. } => "stage_month",
            Self::WeekTargetTitle { .. } => "week_target_title",
            Self::KrTitle { .. } => "kr_title",
            Self::KrInitialProgress { .. } => "kr_initial_progress",
            Self::KrProgress { .. } => "kr_progress",
            Self::InboxText => "inbox_text",
            Self::EditNote { .. } => "edit_note",
            Self::NoteTaskDate { .. } => "note_task_date",
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<UserId, Pending>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic mid-step leaves a stale entry at worst; the map stays usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Pending>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove and return the user's pending input.
    pub fn take(&self, user: UserId) -> Option<Pending> {
        self.lock().remove(&user)
    }

    /// Replace whatever the user had pending.
    pub fn put(&self, user: UserId, pending: Pending) {
        self.lock().insert(user, pending);
    }

    pub fn clear(&self, user: UserId) {
        self.lock().remove(&user);
    }

    pub fn get(&self, user: UserId) -> Option<Pending> {
        self.lock().get(&user).cloned()
    }

    pub fn is_pending(&self, user: UserId) -> bool {
        self.lock().contains_key(&user)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes_entry() {
        let sessions = SessionRegistry::new();
        let user = UserId(1);
        sessions.put(user, Pending::InboxText);
        assert!(sessions.is_pending(user));
        assert_eq!(sessions.take(user), Some(Pending::InboxText));
        assert!(!sessions.is_pending(user));
        assert_eq!(sessions.take(user), None);
    }

    #[test]
    fn put_replaces_previous_variant() {
        let sessions = SessionRegistry::new();
        let user = UserId(2);
        sessions.put(user, Pending::GoalTitle);
        sessions.put(user, Pending::GoalDue { objective_id: 5 });
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.get(user), Some(Pending::GoalDue { objective_id: 5 }));
    }

    #[test]
    fn users_are_isolated() {
        let sessions = SessionRegistry::new();
        sessions.put(UserId(1), Pending::WeekText);
        sessions.clear(UserId(2));
        assert_eq!(sessions.get(UserId(1)), Some(Pending::WeekText));
        assert_eq!(sessions.get(UserId(2)), None);
    }
}
