//! Typed inline-button payloads.
//!
//! On the wire a payload is an underscore-separated string such as
//! `today_toggle_12` or `okr_kr_pinc_4_-10`; handlers only ever see
//! [`Callback`].

use std::fmt;
use std::str::FromStr;

use planbot_core::{CoreError, Quarter, TaskLevel};

/// Answer to "which day should the note become a task on?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayChoice {
    Tomorrow,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    TodayAdd,
    TodayEdit(i64),
    TodayToggle(i64),
    TodayRefresh,

    WeekAdd,
    WeekToggle(i64),
    WeekPush(i64),
    WeekMoveNext,
    WeekRefresh,
    WeekTargetAdd(i64),

    MonthAdd,
    MonthToggle(i64),
    MonthPush(i64),
    MonthRefresh,
    MonthAddStage,

    StageGoal(i64),
    GoalAddStage(i64),
    StageMonth(u32),
    StageMonthDone,

    OkrAddGoal,
    OkrCancelGoal,
    OkrObjective(i64),
    OkrQuarter { objective: i64, quarter: Quarter },
    OkrDue(i64),
    OkrBack,
    KrStep { kr: i64, delta: i32 },
    KrProgress(i64),
    KrPin(i64),
    KrPinLevel { kr: i64, level: TaskLevel },
    KrAdd { objective: i64, quarter: Quarter },

    InboxAdd,
    InboxNote(i64),
    InboxEdit(i64),
    InboxGoal(i64),
    InboxTask(i64),
    InboxArchive(i64),
    InboxBack,
    TaskDay { note: i64, choice: DayChoice },

    StatsToday,
    StatsBack,

    LinkSkip,
    LinkChooseGoal(i64),
    LinkGoal { task: i64, goal: i64 },
    ChooseCategory(Option<i64>),

    TaskStartOk(i64),
    TaskStartSnooze(i64),
    TaskEndOk(i64),
    TaskEndSnooze(i64),

    SettingsDigest,
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::TodayAdd => f.write_str("today_add"),
            Self::TodayEdit(id) => write!(f, "today_edit_{id}"),
            Self::TodayToggle(id) => write!(f, "today_toggle_{id}"),
            Self::TodayRefresh => f.write_str("today_refresh"),
            Self::WeekAdd => f.write_str("week_add"),
            Self::WeekToggle(id) => write!(f, "week_toggle_{id}"),
            Self::WeekPush(id) => write!(f, "week_push_{id}"),
            Self::WeekMoveNext => f.write_str("week_move_next"),
            Self::WeekRefresh => f.write_str("week_refresh"),
            Self::WeekTargetAdd(stage) => write!(f, "stage_week_{stage}"),
            Self::MonthAdd => f.write_str("month_add"),
            Self::MonthToggle(id) => write!(f, "month_toggle_{id}"),
            Self::MonthPush(id) => write!(f, "month_push_{id}"),
            Self::MonthRefresh => f.write_str("month_refresh"),
            Self::MonthAddStage => f.write_str("month_add_stage"),
            Self::StageGoal(goal) => write!(f, "stage_goal_{goal}"),
            Self::GoalAddStage(goal) => write!(f, "goal_add_stage_{goal}"),
            Self::StageMonth(month) => write!(f, "stage_month_{month}"),
            Self::StageMonthDone => f.write_str("stage_month_done"),
            Self::OkrAddGoal => f.write_str("okr_add_goal"),
            Self::OkrCancelGoal => f.write_str("okr_cancel_goal"),
            Self::OkrObjective(id) => write!(f, "okr_obj_{id}"),
            Self::OkrQuarter { objective, quarter } => write!(f, "okr_q_{objective}_{quarter}"),
            Self::OkrDue(id) => write!(f, "okr_due_{id}"),
            Self::OkrBack => f.write_str("okr_back"),
            Self::KrStep { kr, delta } => write!(f, "okr_kr_pinc_{kr}_{delta}"),
            Self::KrProgress(kr) => write!(f, "okr_kr_prog_{kr}"),
            Self::KrPin(kr) => write!(f, "okr_kr_pin_{kr}"),
            Self::KrPinLevel { kr, level } => write!(f, "okr_pin_lvl_{kr}_{level}"),
            Self::KrAdd { objective, quarter } => write!(f, "okr_kr_add_{objective}_{quarter}"),
            Self::InboxAdd => f.write_str("inbox_add"),
            Self::InboxNote(id) => write!(f, "inbox_note_{id}"),
            Self::InboxEdit(id) => write!(f, "inbox_edit_{id}"),
            Self::InboxGoal(id) => write!(f, "inbox_goal_{id}"),
            Self::InboxTask(id) => write!(f, "inbox_task_{id}"),
            Self::InboxArchive(id) => write!(f, "inbox_archive_{id}"),
            Self::InboxBack => f.write_str("inbox_back"),
            Self::TaskDay { note, choice } => {
                let choice = match choice {
                    DayChoice::Tomorrow => "tomorrow",
                    DayChoice::Ask => "ask",
                };
                write!(f, "task_day_{note}_{choice}")
            },
            Self::StatsToday => f.write_str("stats_today"),
            Self::StatsBack => f.write_str("stats_back"),
            Self::LinkSkip => f.write_str("link_skip"),
            Self::LinkChooseGoal(task) => write!(f, "link_choose_goal_{task}"),
            Self::LinkGoal { task, goal } => write!(f, "link_goal_{task}_{goal}"),
            Self::ChooseCategory(Some(id)) => write!(f, "choose_cat_{id}"),
            Self::ChooseCategory(None) => f.write_str("choose_cat_none"),
            Self::TaskStartOk(id) => write!(f, "task_start_ok_{id}"),
            Self::TaskStartSnooze(id) => write!(f, "task_start_snooze_{id}"),
            Self::TaskEndOk(id) => write!(f, "task_end_ok_{id}"),
            Self::TaskEndSnooze(id) => write!(f, "task_end_snooze_{id}"),
            Self::SettingsDigest => f.write_str("settings_digest"),
        }
    }
}

impl FromStr for Callback {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).ok_or_else(|| CoreError::Parse(format!("unknown callback payload: {s}")))
    }
}

// No prefix here is a prefix of another, so the first hit is the only hit.
const PREFIXES: &[&str] = &[
    "today_edit_",
    "today_toggle_",
    "week_toggle_",
    "week_push_",
    "stage_week_",
    "month_toggle_",
    "month_push_",
    "stage_goal_",
    "goal_add_stage_",
    "stage_month_",
    "okr_obj_",
    "okr_q_",
    "okr_due_",
    "okr_kr_pinc_",
    "okr_kr_prog_",
    "okr_kr_pin_",
    "okr_pin_lvl_",
    "okr_kr_add_",
    "inbox_note_",
    "inbox_edit_",
    "inbox_goal_",
    "inbox_task_",
    "inbox_archive_",
    "task_day_",
    "link_choose_goal_",
    "link_goal_",
    "choose_cat_",
    "task_start_ok_",
    "task_start_snooze_",
    "task_end_ok_",
    "task_end_snooze_",
];

fn decode(s: &str) -> Option<Callback> {
    use Callback as C;

    let exact = match s {
        "today_add" => Some(C::TodayAdd),
        "today_refresh" => Some(C::TodayRefresh),
        "week_add" => Some(C::WeekAdd),
        "week_move_next" => Some(C::WeekMoveNext),
        "week_refresh" => Some(C::WeekRefresh),
        "month_add" => Some(C::MonthAdd),
        "month_refresh" => Some(C::MonthRefresh),
        "month_add_stage" => Some(C::MonthAddStage),
        "stage_month_done" => Some(C::StageMonthDone),
        "okr_add_goal" => Some(C::OkrAddGoal),
        "okr_cancel_goal" => Some(C::OkrCancelGoal),
        "okr_back" => Some(C::OkrBack),
        "inbox_add" => Some(C::InboxAdd),
        "inbox_back" => Some(C::InboxBack),
        "stats_today" => Some(C::StatsToday),
        "stats_back" => Some(C::StatsBack),
        "link_skip" => Some(C::LinkSkip),
        "choose_cat_none" => Some(C::ChooseCategory(None)),
        "settings_digest" => Some(C::SettingsDigest),
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }

    let (prefix, rest) = PREFIXES.iter().find_map(|p| s.strip_prefix(p).map(|rest| (*p, rest)))?;
    match prefix {
        "today_edit_" => id(rest).map(C::TodayEdit),
        "today_toggle_" => id(rest).map(C::TodayToggle),
        "week_toggle_" => id(rest).map(C::WeekToggle),
        "week_push_" => id(rest).map(C::WeekPush),
        "stage_week_" => id(rest).map(C::WeekTargetAdd),
        "month_toggle_" => id(rest).map(C::MonthToggle),
        "month_push_" => id(rest).map(C::MonthPush),
        "stage_goal_" => id(rest).map(C::StageGoal),
        "goal_add_stage_" => id(rest).map(C::GoalAddStage),
        "stage_month_" => rest.parse().ok().filter(|m| (1..=12).contains(m)).map(C::StageMonth),
        "okr_obj_" => id(rest).map(C::OkrObjective),
        "okr_q_" => {
            let (objective, quarter) = pair(rest)?;
            Some(C::OkrQuarter { objective: id(objective)?, quarter: quarter.parse().ok()? })
        },
        "okr_due_" => id(rest).map(C::OkrDue),
        "okr_kr_pinc_" => {
            let (kr, delta) = pair(rest)?;
            Some(C::KrStep { kr: id(kr)?, delta: delta.parse().ok()? })
        },
        "okr_kr_prog_" => id(rest).map(C::KrProgress),
        "okr_kr_pin_" => id(rest).map(C::KrPin),
        "okr_pin_lvl_" => {
            let (kr, level) = pair(rest)?;
            Some(C::KrPinLevel { kr: id(kr)?, level: level.parse().ok()? })
        },
        "okr_kr_add_" => {
            let (objective, quarter) = pair(rest)?;
            Some(C::KrAdd { objective: id(objective)?, quarter: quarter.parse().ok()? })
        },
        "inbox_note_" => id(rest).map(C::InboxNote),
        "inbox_edit_" => id(rest).map(C::InboxEdit),
        "inbox_goal_" => id(rest).map(C::InboxGoal),
        "inbox_task_" => id(rest).map(C::InboxTask),
        "inbox_archive_" => id(rest).map(C::InboxArchive),
        "task_day_" => {
            let (note, choice) = pair(rest)?;
            let choice = match choice {
                "tomorrow" => DayChoice::Tomorrow,
                "ask" => DayChoice::Ask,
                _ => return None,
            };
            Some(C::TaskDay { note: id(note)?, choice })
        },
        "link_choose_goal_" => id(rest).map(C::LinkChooseGoal),
        "link_goal_" => {
            let (task, goal) = pair(rest)?;
            Some(C::LinkGoal { task: id(task)?, goal: id(goal)? })
        },
        "choose_cat_" => id(rest).map(|cat| C::ChooseCategory(Some(cat))),
        "task_start_ok_" => id(rest).map(C::TaskStartOk),
        "task_start_snooze_" => id(rest).map(C::TaskStartSnooze),
        "task_end_ok_" => id(rest).map(C::TaskEndOk),
        "task_end_snooze_" => id(rest).map(C::TaskEndSnooze),
        _ => None,
    }
}

fn id(s: &str) -> Option<i64> {
    s.parse().ok().filter(|v: &i64| *v > 0)
}

fn pair(s: &str) -> Option<(&str, &str)> {
    s.split_once('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_ok(s: &str) -> Callback {
        s.parse().unwrap()
    }

    #[test]
    fn decodes_legacy_payloads() {
        assert_eq!(decode_ok("today_toggle_12"), Callback::TodayToggle(12));
        assert_eq!(decode_ok("okr_kr_pinc_4_-10"), Callback::KrStep { kr: 4, delta: -10 });
        assert_eq!(decode_ok("okr_kr_pin_4"), Callback::KrPin(4));
        assert_eq!(
            decode_ok("okr_q_7_Q3"),
            Callback::OkrQuarter { objective: 7, quarter: Quarter::Q3 }
        );
        assert_eq!(
            decode_ok("okr_pin_lvl_9_week"),
            Callback::KrPinLevel { kr: 9, level: TaskLevel::Week }
        );
        assert_eq!(
            decode_ok("task_day_5_tomorrow"),
            Callback::TaskDay { note: 5, choice: DayChoice::Tomorrow }
        );
        assert_eq!(decode_ok("stage_month_11"), Callback::StageMonth(11));
        assert_eq!(decode_ok("stage_month_done"), Callback::StageMonthDone);
        assert_eq!(decode_ok("choose_cat_none"), Callback::ChooseCategory(None));
        assert_eq!(decode_ok("choose_cat_3"), Callback::ChooseCategory(Some(3)));
        assert_eq!(decode_ok("month_add_stage"), Callback::MonthAddStage);
        assert_eq!(decode_ok("month_add"), Callback::MonthAdd);
    }

    #[test]
    fn encode_matches_wire_grammar() {
        assert_eq!(Callback::KrAdd { objective: 2, quarter: Quarter::Q1 }.to_string(), "okr_kr_add_2_Q1");
        assert_eq!(Callback::LinkGoal { task: 8, goal: 1 }.to_string(), "link_goal_8_1");
        assert_eq!(Callback::TaskEndSnooze(6).to_string(), "task_end_snooze_6");
        assert_eq!(Callback::TaskDay { note: 2, choice: DayChoice::Ask }.to_string(), "task_day_2_ask");
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        for bad in [
            "",
            "nope",
            "today_toggle_",
            "today_toggle_x",
            "today_toggle_-1",
            "stage_month_13",
            "okr_q_7_Q5",
            "task_day_5_yesterday",
            "okr_pin_lvl_1_year",
        ] {
            assert!(bad.parse::<Callback>().is_err(), "{bad} should not decode");
        }
    }
}
