//! Free-form date and time parsing.
//!
//! Accepted inputs mirror what users type into the chat: `14:00`,
//! `Q1-2026`, `31.12.2025`, `31/12/2025`, `90` or `1:30` (durations) and
//! `07.06` (day-month answers).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{DUE_HORIZON_DAYS, MAX_TASK_DURATION_MINUTES};
use crate::error::CoreError;
use crate::model::Quarter;

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").unwrap());

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static QUARTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[Qq]([1-4])-(\d{4})$").unwrap());

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[./-](\d{1,2})[./-](20\d{2})$").unwrap());

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static DAY_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[./-](\d{1,2})$").unwrap());

/// Parse a 24h `H:MM` / `HH:MM` time.
#[must_use]
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(s.trim())?;
    let hour = caps.get(1)?.as_str().parse().ok()?;
    let minute = caps.get(2)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Deadline of an objective: either a quarter label or a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DueDate {
    Quarter { quarter: Quarter, year: i32 },
    Date(NaiveDate),
}

impl DueDate {
    /// Date used for horizon comparisons: a quarter counts as the first day of its first month.
    #[must_use]
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        match *self {
            Self::Quarter { quarter, year } => NaiveDate::from_ymd_opt(year, quarter.first_month(), 1),
            Self::Date(date) => Some(date),
        }
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Quarter { quarter, year } => write!(f, "{quarter}-{year:04}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for DueDate {
    type Err = CoreError;

    /// Accepts everything `parse_due` accepts plus the stored ISO form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(due) = parse_due(s) {
            return Ok(due);
        }
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| CoreError::Parse(format!("not a due date: {s}")))
    }
}

impl From<DueDate> for String {
    fn from(value: DueDate) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DueDate {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parse a user-typed deadline: `Qn-YYYY` (any case `q`) or `D.M.20YY` with `.`, `-` or `/`.
///
/// Invalid calendar dates yield `None`, never an approximation.
#[must_use]
pub fn parse_due(s: &str) -> Option<DueDate> {
    let s = s.trim();
    if let Some(caps) = QUARTER_RE.captures(s) {
        let quarter = Quarter::from_number(caps.get(1)?.as_str().parse().ok()?)?;
        let year = caps.get(2)?.as_str().parse().ok()?;
        return Some(DueDate::Quarter { quarter, year });
    }
    let caps = DATE_RE.captures(s)?;
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let year = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(DueDate::Date)
}

/// Whether the deadline lies no more than a year ahead of `today` (past deadlines count).
#[must_use]
pub fn due_within_year(due: &DueDate, today: NaiveDate) -> bool {
    due.anchor_date()
        .is_some_and(|target| (target - today).num_days() <= DUE_HORIZON_DAYS)
}

/// Parse a task duration given as minutes (`90`) or `H:MM` (`1:30`, `1,30`).
///
/// # Errors
/// `CoreError::Parse` for malformed input, `CoreError::InvalidInput` when
/// outside `1..=720` minutes.
pub fn parse_duration(s: &str) -> Result<u32, CoreError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect::<String>().replace(',', ":");
    let malformed = || CoreError::Parse(format!("not a duration: {s}"));
    let minutes: i64 = if let Some((h, m)) = compact.split_once(':') {
        let hours: i64 = h.parse().map_err(|_| malformed())?;
        let mins: i64 = m.parse().map_err(|_| malformed())?;
        hours.saturating_mul(60).saturating_add(mins)
    } else {
        compact.parse().map_err(|_| malformed())?
    };
    if minutes <= 0 || minutes > i64::from(MAX_TASK_DURATION_MINUTES) {
        return Err(CoreError::InvalidInput(format!(
            "duration must be between 1 and {MAX_TASK_DURATION_MINUTES} minutes"
        )));
    }
    u32::try_from(minutes).map_err(|_| malformed())
}

/// Parse `DD.MM` relative to `today`; a date already past this year rolls to next year.
#[must_use]
pub fn parse_day_month(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = DAY_MONTH_RE.captures(s.trim())?;
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    date_rolling_forward(day, month, today)
}

/// Build `day.month` in `today`'s year, or next year when that date is already past.
#[must_use]
pub fn date_rolling_forward(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date < today { NaiveDate::from_ymd_opt(today.year() + 1, month, day) } else { Some(date) }
}

/// Monday of the ISO week containing `d`.
#[must_use]
pub fn monday_of_week(d: NaiveDate) -> NaiveDate {
    d - Duration::days(i64::from(d.weekday().num_days_from_monday()))
}

#[must_use]
pub fn next_monday(d: NaiveDate) -> NaiveDate {
    monday_of_week(d) + Duration::days(7)
}

#[must_use]
pub fn first_day_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

const MONTHS_RU: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь", "Октябрь",
    "Ноябрь", "Декабрь",
];

const MONTHS_SHORT: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Full month name for headers; empty for an out-of-range month.
#[must_use]
pub fn month_name_ru(month: u32) -> &'static str {
    month_index(month).and_then(|i| MONTHS_RU.get(i)).copied().unwrap_or("")
}

/// Three-letter month label for the month picker.
#[must_use]
pub fn month_abbrev(month: u32) -> &'static str {
    month_index(month).and_then(|i| MONTHS_SHORT.get(i)).copied().unwrap_or("")
}

fn month_index(month: u32) -> Option<usize> {
    usize::try_from(month).ok()?.checked_sub(1)
}
