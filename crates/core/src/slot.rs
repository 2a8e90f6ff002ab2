//! Recovers a `(date, start, end, description)` slot from free text,
//! typically a completion reply such as `"завтра с 09:00–10:00 созвон"`.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_SLOT;
use crate::dates::{date_rolling_forward, parse_time};
use crate::lexicon::RELATIVE_DAYS;

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[сc]\s*)?(\d{1,2}[:.]\d{2})\s*[-–‑‒]\s*(\d{1,2}[:.]\d{2})").unwrap()
});

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static DATE_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})[./-](\d{1,2})\s+(?:[сc]\s*)?(\d{1,2}[:.]\d{2})\s*[-–‑‒]\s*(\d{1,2}[:.]\d{2})").unwrap()
});

#[allow(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[./-]\d{1,2}\s+$").unwrap());

const DESCRIPTION_TRIM: &[char] = &['-', '–', '‑', '‒', '—', '•', '·', '*'];

/// A scheduling slot found in free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub description: String,
}

/// Extract a slot from `text`, resolving relative and partial dates against `today`.
///
/// Only the first time span counts. Undated, it is placed by `сегодня`/`завтра`
/// words (default today); preceded by `D.M`, it is read as a `D.M H:MM-H:MM`
/// span. Returns `None` when nothing matches or any matched component is not a
/// real date/time.
#[must_use]
pub fn extract_slot(text: &str, today: NaiveDate) -> Option<Slot> {
    let text = text.replace('—', "-");

    let caps = SPAN_RE.captures(&text)?;
    let dated = caps.get(0).is_some_and(|m| DATE_PREFIX_RE.is_match(&text[..m.start()]));
    if !dated {
        let date = today + Duration::days(relative_offset(&text));
        return build_slot(&text, &caps, date, 1);
    }

    let caps = DATE_FIRST_RE.captures(&text)?;
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let date = date_rolling_forward(day, month, today)?;
    build_slot(&text, &caps, date, 3)
}

fn relative_offset(text: &str) -> i64 {
    let lower = text.to_lowercase();
    RELATIVE_DAYS
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map_or(0, |&(_, days)| days)
}

fn build_slot(text: &str, caps: &Captures<'_>, date: NaiveDate, first_time: usize) -> Option<Slot> {
    let start = parse_time(&caps.get(first_time)?.as_str().replace('.', ":"))?;
    let end = parse_time(&caps.get(first_time + 1)?.as_str().replace('.', ":"))?;
    let rest = &text[caps.get(0)?.end()..];
    let description = rest.trim_matches(|c: char| c.is_whitespace() || DESCRIPTION_TRIM.contains(&c));
    let description = if description.is_empty() { UNTITLED_SLOT } else { description };
    Some(Slot { date, start, end, description: description.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn today_word_with_em_dash_description() {
        let today = date(2025, 7, 1);
        let slot = extract_slot("сегодня 14:00–15:30 — Разобрать почту", today).unwrap();
        assert_eq!(slot, Slot {
            date: today,
            start: time(14, 0),
            end: time(15, 30),
            description: "Разобрать почту".to_owned(),
        });
    }

    #[test]
    fn date_first_rolls_into_next_year() {
        let slot = extract_slot("07.06 22:20–22:30 звонок", date(2025, 8, 15)).unwrap();
        assert_eq!(slot.date, date(2026, 6, 7));
        assert_eq!((slot.start, slot.end), (time(22, 20), time(22, 30)));
        assert_eq!(slot.description, "звонок");
    }

    #[test]
    fn date_first_keeps_current_year_when_upcoming() {
        let slot = extract_slot("07.06 22:20-22:30", date(2025, 5, 1)).unwrap();
        assert_eq!(slot.date, date(2025, 6, 7));
        assert_eq!(slot.description, UNTITLED_SLOT);
    }

    #[test]
    fn tomorrow_with_preposition_and_dotted_times() {
        let today = date(2025, 12, 31);
        let slot = extract_slot("Завтра с 9.00‑10.15 созвон с командой", today).unwrap();
        assert_eq!(slot.date, date(2026, 1, 1));
        assert_eq!((slot.start, slot.end), (time(9, 0), time(10, 15)));
        assert_eq!(slot.description, "созвон с командой");
    }

    #[test]
    fn english_relative_words() {
        let today = date(2025, 3, 10);
        assert_eq!(extract_slot("tomorrow 08:00-09:00 gym", today).unwrap().date, date(2025, 3, 11));
        assert_eq!(extract_slot("Today 08:00-09:00 gym", today).unwrap().date, today);
    }

    #[test]
    fn bullet_and_dash_trimmed_from_description() {
        let slot = extract_slot("• 10:00-11:00 — • Зарядка", date(2025, 1, 1)).unwrap();
        assert_eq!(slot.description, "Зарядка");
    }

    #[test]
    fn dated_first_span_wins_over_later_spans() {
        let slot = extract_slot("07.06 10:00-11:00 и 12:00-13:00 встреча", date(2025, 8, 15)).unwrap();
        assert_eq!(slot.date, date(2026, 6, 7));
        assert_eq!((slot.start, slot.end), (time(10, 0), time(11, 0)));
    }

    #[test]
    fn date_first_accepts_preposition() {
        let slot = extract_slot("07.06 с 22:20–22:30 звонок", date(2025, 8, 15)).unwrap();
        assert_eq!(slot, Slot {
            date: date(2026, 6, 7),
            start: time(22, 20),
            end: time(22, 30),
            description: "звонок".to_owned(),
        });
    }

    #[test]
    fn invalid_components_reject_the_whole_match() {
        let today = date(2025, 1, 1);
        assert_eq!(extract_slot("сегодня 25:00-26:00 ночь", today), None);
        assert_eq!(extract_slot("14:00-15:61", today), None);
        assert_eq!(extract_slot("31.09 10:00-11:00 встреча", today), None);
        assert_eq!(extract_slot("просто текст без времени", today), None);
        assert_eq!(extract_slot("", today), None);
    }

    #[test]
    fn extraction_is_total_over_odd_input() {
        let today = date(2025, 6, 30);
        let inputs = [
            "—", "с", "c 1:", "99.99 99:99-99:99", "12.12 ", "завтра", "🟥🟨🟩 10:00-", "0.0 0:00-0:00",
            "\u{0}\u{ffff}", "с—с—с", "1:00 – 2:00 – 3:00", "07.06\t23:59–00:00 ночь",
        ];
        for input in inputs {
            let _ = extract_slot(input, today);
        }
        let slot = extract_slot("07.06\t23:59–00:00 ночь", today).unwrap();
        assert_eq!(slot.date, date(2026, 6, 7));
        assert_eq!(slot.end, time(0, 0));
    }
}
