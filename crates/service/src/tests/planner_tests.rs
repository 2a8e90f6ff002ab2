use chrono::{Datelike as _, NaiveTime, TimeDelta, Timelike as _};
use planbot_core::dates::{first_day_of_month, monday_of_week, next_monday};
use planbot_core::{ProgressChange, Quarter, TaskLevel, TaskStatus, UserId};

use super::{FakeCompleter, harness};
use crate::planner::{DueUpdate, ViewKind, parse_progress};

const OWNER: UserId = UserId(7);
const STRANGER: UserId = UserId(8);

#[expect(clippy::unwrap_used, reason = "test code")]
fn nine() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

#[test]
fn view_kind_round_trips_names() {
    for kind in ViewKind::ALL {
        assert_eq!(kind.as_str().parse::<ViewKind>().ok(), Some(kind));
    }
    assert!("yesterday".parse::<ViewKind>().is_err());
}

#[test]
fn progress_answers_are_bounded() {
    assert_eq!(parse_progress(" 40 "), Some(40));
    assert_eq!(parse_progress("100"), Some(100));
    assert_eq!(parse_progress("101"), None);
    assert_eq!(parse_progress("-5"), None);
    assert_eq!(parse_progress("half"), None);
}

#[test]
fn day_task_carries_slot_in_user_zone() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let task = planner.add_day_task(OWNER, "Run", nine(), 45, None).unwrap();

    assert_eq!(task.due, planner.today());
    assert_eq!(task.level, TaskLevel::Day);
    assert_eq!(task.duration_minutes, Some(45));
    let start = task.start_ts.unwrap();
    assert_eq!(start.offset(), &h.clock.offset());
    assert_eq!((start.hour(), start.minute()), (9, 0));
    assert_eq!(task.end_ts.unwrap() - start, TimeDelta::minutes(45));
}

#[test]
fn week_and_month_tasks_anchor_to_period_start() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let today = planner.today();

    let week = planner.add_week_task(OWNER, "Plan sprint").unwrap();
    assert_eq!(week.due, monday_of_week(today));
    assert_eq!(week.due.weekday(), chrono::Weekday::Mon);

    let month = planner.add_month_task(OWNER, "Budget").unwrap();
    assert_eq!(month.due, first_day_of_month(today));
    assert_eq!(month.due.day(), 1);

    assert!(planner.week_view(OWNER).unwrap().text.contains("Plan sprint"));
    assert!(planner.month_view(OWNER).unwrap().text.contains("Budget"));
}

#[test]
fn edit_keeps_text_on_dash() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let task = planner.add_task_on(OWNER, "Draft", planner.today()).unwrap();

    assert!(!planner.edit_task_text(OWNER, task.id, "-").unwrap());
    assert_eq!(planner.task(OWNER, task.id).unwrap().unwrap().text, "Draft");

    assert!(planner.edit_task_text(OWNER, task.id, "Final").unwrap());
    assert_eq!(planner.task(OWNER, task.id).unwrap().unwrap().text, "Final");

    assert!(planner.edit_task_text(OWNER, task.id, "   ").is_err());
}

#[test]
fn tasks_are_invisible_to_other_owners() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let task = planner.add_task_on(OWNER, "Private", planner.today()).unwrap();

    assert!(planner.task(STRANGER, task.id).unwrap().is_none());
    assert!(planner.toggle_task(STRANGER, task.id).unwrap_err().is_not_found());
    assert!(!planner.today_view(STRANGER).unwrap().text.contains("Private"));
}

#[test]
fn toggling_a_pinned_task_moves_its_key_result() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let objective = planner.add_objective(OWNER, "Health").unwrap();
    let kr = planner.add_key_result(OWNER, objective.id, Quarter::Q2, "Run 100 km", 50).unwrap();

    let task = planner.pin_key_result(OWNER, kr.id, TaskLevel::Week).unwrap();
    assert_eq!(task.level, TaskLevel::Week);
    assert_eq!(task.due, monday_of_week(planner.today()));
    assert_eq!(task.kr_id, Some(kr.id));
    assert!(planner.key_result(OWNER, kr.id).unwrap().unwrap().pinned);

    planner.toggle_task(OWNER, task.id).unwrap();
    assert_eq!(planner.key_result(OWNER, kr.id).unwrap().unwrap().progress, 60);
    planner.toggle_task(OWNER, task.id).unwrap();
    assert_eq!(planner.key_result(OWNER, kr.id).unwrap().unwrap().progress, 50);
}

#[test]
fn confirm_end_completes_task_and_raises_progress() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let objective = planner.add_objective(OWNER, "Career").unwrap();
    let kr = planner.add_key_result(OWNER, objective.id, Quarter::Q1, "Ship v1", 95).unwrap();
    let task = planner.pin_key_result(OWNER, kr.id, TaskLevel::Day).unwrap();

    planner.confirm_start(OWNER, task.id).unwrap();
    assert_eq!(planner.task(OWNER, task.id).unwrap().unwrap().status, TaskStatus::Started);

    let done = planner.confirm_end(OWNER, task.id).unwrap();
    assert!(done.done);
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(planner.key_result(OWNER, kr.id).unwrap().unwrap().progress, 100);
}

#[test]
fn kr_progress_is_clamped() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let objective = planner.add_objective(OWNER, "Learn").unwrap();
    let kr = planner.add_key_result(OWNER, objective.id, Quarter::Q3, "Read", 5).unwrap();

    let kr = planner.change_kr_progress(OWNER, kr.id, ProgressChange::Delta(-10)).unwrap();
    assert_eq!(kr.progress, 0);
    let kr = planner.change_kr_progress(OWNER, kr.id, ProgressChange::Set(250)).unwrap();
    assert_eq!(kr.progress, 100);
}

#[test]
fn push_and_move_change_level_and_due() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let today = planner.today();

    let month = planner.add_month_task(OWNER, "Taxes").unwrap();
    let week = planner.push_month_task_to_week(OWNER, month.id).unwrap();
    assert_eq!((week.level, week.due), (TaskLevel::Week, monday_of_week(today)));

    let day = planner.push_week_task_to_today(OWNER, week.id).unwrap();
    assert_eq!((day.level, day.due), (TaskLevel::Day, today));

    let open = planner.add_week_task(OWNER, "Open").unwrap();
    let closed = planner.add_week_task(OWNER, "Closed").unwrap();
    planner.toggle_task(OWNER, closed.id).unwrap();
    assert_eq!(planner.move_week_to_next(OWNER).unwrap(), 1);
    assert_eq!(planner.task(OWNER, open.id).unwrap().unwrap().due, next_monday(today));
    assert_eq!(planner.task(OWNER, closed.id).unwrap().unwrap().due, monday_of_week(today));
}

#[test]
fn linking_requires_an_existing_goal() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let task = planner.add_task_on(OWNER, "Gym", planner.today()).unwrap();
    let goal = planner.add_objective(OWNER, "Health").unwrap();

    assert_eq!(planner.link_task_to_goal(OWNER, task.id, goal.id).unwrap().goal_id, Some(goal.id));
    assert!(planner.link_task_to_goal(OWNER, task.id, goal.id + 100).unwrap_err().is_not_found());
}

#[test]
fn coverage_gap_needs_two_covered_categories() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    assert_eq!(planner.coverage_gap(OWNER).unwrap(), None);

    let health = h.storage.insert_category(OWNER, "Health", None).unwrap();
    let work = h.storage.insert_category(OWNER, "Work", None).unwrap();
    let gap = planner.coverage_gap(OWNER).unwrap().unwrap();
    assert_eq!(gap.len(), 2);

    planner.add_day_task(OWNER, "Run", nine(), 30, Some(health)).unwrap();
    let gap = planner.coverage_gap(OWNER).unwrap().unwrap();
    assert_eq!(gap.iter().map(|c| c.id).collect::<Vec<_>>(), vec![work]);

    planner.add_day_task(OWNER, "Report", nine(), 30, Some(work)).unwrap();
    assert_eq!(planner.coverage_gap(OWNER).unwrap(), None);
}

#[test]
fn objective_due_updates() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let objective = planner.add_objective(OWNER, "House").unwrap();
    let year = planner.today().year();

    assert_eq!(planner.set_objective_due(OWNER, objective.id, "-").unwrap(), DueUpdate::Kept);
    assert_eq!(planner.set_objective_due(OWNER, objective.id, "soon").unwrap(), DueUpdate::Invalid);

    let far = format!("Q1-{}", year + 3);
    match planner.set_objective_due(OWNER, objective.id, &far).unwrap() {
        DueUpdate::Changed { objective, within_year } => {
            assert!(!within_year);
            assert_eq!(objective.due.unwrap().to_string(), far);
        },
        other => panic!("unexpected update: {other:?}"),
    }
}

#[test]
fn stages_and_week_targets_show_up_in_views() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let goal = planner.add_objective(OWNER, "Marathon").unwrap();
    let month = planner.today().month();

    let stage = planner.add_stage(OWNER, goal.id, "Base mileage", month).unwrap();
    planner.add_week_target(OWNER, stage, "Three easy runs").unwrap();

    let month_view = planner.month_view(OWNER).unwrap();
    assert!(month_view.text.contains("🎯 Marathon"));
    assert!(month_view.text.contains("Base mileage"));
    assert!(month_view.payloads().contains(&format!("stage_week_{stage}").as_str()));
    assert!(planner.week_view(OWNER).unwrap().text.contains("Three easy runs"));

    assert!(planner.add_stage(OWNER, goal.id + 50, "Orphan", month).unwrap_err().is_not_found());
}

#[test]
fn inbox_note_lifecycle() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let long = "x".repeat(80);
    let idea = planner.add_note(OWNER, &long).unwrap();
    let chore = planner.add_note(OWNER, "Buy milk").unwrap();
    assert_eq!(planner.notes_created_today(OWNER).unwrap(), 2);

    let objective = planner.note_to_objective(OWNER, idea.id).unwrap();
    assert_eq!(objective.title.chars().count(), 60);
    assert!(planner.note(OWNER, idea.id).unwrap().unwrap().archived);

    let due = planner.today() + TimeDelta::days(1);
    let task = planner.note_to_task(OWNER, chore.id, due).unwrap();
    assert_eq!((task.text.as_str(), task.due), ("Buy milk", due));

    let inbox = planner.inbox_view(OWNER).unwrap();
    assert!(!inbox.text.contains("Buy milk"));
}

#[test]
fn stats_today_records_the_day() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let done = planner.add_task_on(OWNER, "A", planner.today()).unwrap();
    planner.add_task_on(OWNER, "B", planner.today()).unwrap();
    planner.toggle_task(OWNER, done.id).unwrap();

    let message = planner.stats_today(OWNER).unwrap();
    assert!(message.text.contains("Процент дня:  50%"));
    let stat = h.storage.daily_stat(OWNER, planner.today()).unwrap();
    assert_eq!((stat.done, stat.total), (1, 2));
}

#[test]
fn stats_view_shows_totals_without_recording() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    planner.add_task_on(OWNER, "A", planner.today()).unwrap();

    let message = planner.view(OWNER, ViewKind::Stats).unwrap();
    assert!(message.text.contains("Задач всего: 1"));
    assert!(message.text.contains("Процент дня:  0%"));
    assert!(h.storage.list_daily_stats(OWNER).unwrap().is_empty());
}

#[test]
fn digest_defaults_on_and_toggles() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    assert!(planner.digest_enabled(OWNER).unwrap());
    assert!(!planner.toggle_digest(OWNER).unwrap());
    assert!(!planner.digest_enabled(OWNER).unwrap());
    assert!(planner.settings_view(OWNER).unwrap().text.contains("выключено"));
    assert!(planner.toggle_digest(OWNER).unwrap());
}

#[test]
fn reset_removes_only_that_owner() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    planner.add_objective(OWNER, "Mine").unwrap();
    planner.add_note(OWNER, "note").unwrap();
    planner.add_objective(STRANGER, "Theirs").unwrap();

    assert!(planner.reset(OWNER).unwrap() >= 2);
    assert!(!planner.has_objectives(OWNER).unwrap());
    assert!(planner.has_objectives(STRANGER).unwrap());
}
