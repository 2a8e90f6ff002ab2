use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::dates::DueDate;
use crate::error::CoreError;

/// Calendar quarter a key result is planned for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    /// Label used on the quarter picker buttons.
    #[must_use]
    pub const fn roman(&self) -> &'static str {
        match *self {
            Self::Q1 => "I",
            Self::Q2 => "II",
            Self::Q3 => "III",
            Self::Q4 => "IV",
        }
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        match *self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    #[must_use]
    pub const fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(Self::Q1),
            2 => Some(Self::Q2),
            3 => Some(Self::Q3),
            4 => Some(Self::Q4),
            _ => None,
        }
    }

    /// First calendar month of the quarter (1, 4, 7 or 10).
    #[must_use]
    pub const fn first_month(&self) -> u32 {
        (self.number() - 1) * 3 + 1
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quarter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        upper
            .strip_prefix('Q')
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(Self::from_number)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown quarter: {s}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Objective {
    pub id: i64,
    pub owner: UserId,
    pub title: String,
    pub due: Option<DueDate>,
    pub due_history: Vec<DueRevision>,
    pub created_at: DateTime<Utc>,
}

/// Previous due value, recorded only when the due actually changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueRevision {
    pub ts: DateTime<Utc>,
    pub due: Option<DueDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyResult {
    pub id: i64,
    pub owner: UserId,
    pub objective_id: i64,
    pub title: String,
    pub quarter: Quarter,
    pub progress: u8,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// An objective together with all of its key results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OkrBranch {
    pub objective: Objective,
    pub key_results: Vec<KeyResult>,
}

/// Integer (floor) mean of key-result progress; `None` without key results.
#[must_use]
pub fn average_progress(krs: &[KeyResult]) -> Option<u8> {
    if krs.is_empty() {
        return None;
    }
    let sum: usize = krs.iter().map(|k| usize::from(k.progress)).sum();
    u8::try_from(sum / krs.len()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kr(progress: u8) -> KeyResult {
        KeyResult {
            id: 1,
            owner: UserId(1),
            objective_id: 1,
            title: "kr".to_owned(),
            quarter: Quarter::Q1,
            progress,
            pinned: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quarter_parses_case_insensitive() {
        assert_eq!("q3".parse::<Quarter>().unwrap(), Quarter::Q3);
        assert_eq!("Q4".parse::<Quarter>().unwrap(), Quarter::Q4);
        assert!("Q5".parse::<Quarter>().is_err());
        assert!("3".parse::<Quarter>().is_err());
    }

    #[test]
    fn quarter_first_months() {
        let months: Vec<u32> = Quarter::ALL.iter().map(Quarter::first_month).collect();
        assert_eq!(months, vec![1, 4, 7, 10]);
    }

    #[test]
    fn average_progress_floors() {
        assert_eq!(average_progress(&[]), None);
        assert_eq!(average_progress(&[kr(10), kr(15)]), Some(12));
        assert_eq!(average_progress(&[kr(100)]), Some(100));
    }
}
