use serde::{Deserialize, Serialize};

use crate::constants::{KR_PROGRESS_MAX, KR_PROGRESS_STEP};

/// Requested change of key-result progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressChange {
    Set(i32),
    Delta(i32),
}

impl ProgressChange {
    pub const STEP_UP: Self = Self::Delta(KR_PROGRESS_STEP);
    pub const STEP_DOWN: Self = Self::Delta(-KR_PROGRESS_STEP);

    /// New progress, clamped to `0..=100`.
    #[must_use]
    pub fn apply(self, current: u8) -> u8 {
        let raw = match self {
            Self::Set(value) => value,
            Self::Delta(delta) => i32::from(current).saturating_add(delta),
        };
        clamp_progress(raw)
    }
}

#[must_use]
pub fn clamp_progress(raw: i32) -> u8 {
    u8::try_from(raw.clamp(0, i32::from(KR_PROGRESS_MAX))).unwrap_or(KR_PROGRESS_MAX)
}

/// Traffic-light marker for a progress percentage.
#[must_use]
pub const fn progress_dot(progress: u8) -> &'static str {
    if progress < 30 {
        "🟥"
    } else if progress < 70 {
        "🟨"
    } else {
        "🟩"
    }
}
