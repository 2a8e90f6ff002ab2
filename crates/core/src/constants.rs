//! Shared constants for planbot.
//!
//! Centralizes magic numbers that would otherwise be duplicated across crates.

/// Step applied by the `+10%` / `-10%` key-result buttons and by task completion.
pub const KR_PROGRESS_STEP: i32 = 10;

/// Upper bound of key-result progress (percent).
pub const KR_PROGRESS_MAX: u8 = 100;

/// Minimum number of categories the onboarding dialogue accepts.
pub const MIN_CATEGORIES: usize = 3;

/// Minimum number of distinct categories a day should cover before the bot
/// stops nudging for another task.
pub const MIN_COVERED_CATEGORIES: usize = 2;

/// Longest accepted task duration, in minutes.
pub const MAX_TASK_DURATION_MINUTES: u32 = 720;

/// Snooze delay for start/end reminders, in seconds.
pub const SNOOZE_SECS: u64 = 900;

/// Local hour of the daily inbox digest.
pub const INBOX_REMINDER_HOUR: u32 = 20;

/// Look-ahead window used by the secretary, in days.
pub const FUTURE_TASK_WINDOW_DAYS: i64 = 30;

/// Character budget of an inbox button preview.
pub const INBOX_PREVIEW_CHARS: usize = 40;

/// Character budget of an objective title created from an inbox note.
pub const NOTE_TO_OBJECTIVE_CHARS: usize = 60;

/// Horizon of `due_within_year`, in days.
pub const DUE_HORIZON_DAYS: i64 = 365;

/// Placeholder description for a slot without trailing text.
pub const UNTITLED_SLOT: &str = "Без названия";

/// Default user time zone offset (Europe/Moscow, no DST).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 180;
