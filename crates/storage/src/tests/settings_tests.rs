use planbot_core::{DailyStat, NewTask, Quarter, TaskLevel, UserId};
use serde_json::json;

use super::{create_test_storage, date};

const OWNER: UserId = UserId(3);

#[test]
fn settings_upsert_per_key() {
    let (storage, _dir) = create_test_storage();
    assert_eq!(storage.get_setting(OWNER, "inbox_reminder").unwrap(), None);
    storage.set_setting(OWNER, "inbox_reminder", &json!(true)).unwrap();
    storage.set_setting(OWNER, "inbox_reminder", &json!(false)).unwrap();
    assert_eq!(storage.get_setting(OWNER, "inbox_reminder").unwrap(), Some(json!(false)));
    assert_eq!(storage.list_settings(OWNER).unwrap().len(), 1);
    assert_eq!(storage.get_setting(UserId(4), "inbox_reminder").unwrap(), None);
}

#[test]
fn known_chats_keep_latest_chat() {
    let (storage, _dir) = create_test_storage();
    storage.remember_chat(OWNER, 10).unwrap();
    storage.remember_chat(OWNER, 11).unwrap();
    storage.remember_chat(UserId(9), 90).unwrap();
    let chats = storage.known_chats().unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0].owner, OWNER);
    assert_eq!(chats[0].chat_id, 11);
}

#[test]
fn daily_stat_upserts() {
    let (storage, _dir) = create_test_storage();
    let day = date(2025, 9, 1);
    assert_eq!(storage.daily_stat(OWNER, day).unwrap(), DailyStat::empty(OWNER, day));
    storage.record_daily_stat(&DailyStat { owner: OWNER, date: day, done: 1, total: 4 }).unwrap();
    storage.record_daily_stat(&DailyStat { owner: OWNER, date: day, done: 3, total: 4 }).unwrap();
    let stat = storage.daily_stat(OWNER, day).unwrap();
    assert_eq!((stat.done, stat.total, stat.percent()), (3, 4, 75));
    assert_eq!(storage.list_daily_stats(OWNER).unwrap().len(), 1);
}

#[test]
fn stages_and_week_targets() {
    let (storage, _dir) = create_test_storage();
    let goal = storage.insert_objective(OWNER, "Книга", None).unwrap();
    let stage = storage.insert_stage(OWNER, goal.id, "Черновик", 11, 2025).unwrap();
    storage.insert_stage(OWNER, goal.id, "Редактура", 12, 2025).unwrap();
    assert_eq!(storage.stages_for_month(OWNER, 11, 2025).unwrap().len(), 1);
    assert!(storage.insert_stage(UserId(8), goal.id, "x", 1, 2025).unwrap_err().is_not_found());

    let monday = date(2025, 11, 3);
    storage.insert_week_target(OWNER, stage, "Глава 1", monday).unwrap();
    let weeks = storage.week_targets(OWNER, monday).unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].stage_id, stage);
}

#[test]
fn reset_removes_planning_data_only() {
    let (storage, _dir) = create_test_storage();
    let goal = storage.insert_objective(OWNER, "Цель", None).unwrap();
    storage.insert_key_result(OWNER, goal.id, "KR", Quarter::Q1, 0).unwrap();
    storage.insert_task(&NewTask::new(OWNER, "t", date(2025, 1, 1), TaskLevel::Day)).unwrap();
    storage.insert_category(OWNER, "Здоровье", None).unwrap();
    storage.insert_note(OWNER, "n").unwrap();
    let stage = storage.insert_stage(OWNER, goal.id, "s", 1, 2025).unwrap();
    storage.insert_week_target(OWNER, stage, "w", date(2025, 1, 6)).unwrap();
    storage.set_setting(OWNER, "k", &json!(1)).unwrap();
    storage.insert_note(UserId(77), "keep").unwrap();

    assert_eq!(storage.reset_owner(OWNER).unwrap(), 7);

    let export = storage.export(OWNER).unwrap();
    assert!(export.okr.is_empty());
    assert!(export.tasks.is_empty());
    assert!(export.inbox.is_empty());
    assert!(export.categories.is_empty());
    assert!(export.stages.is_empty());
    assert!(export.weeks.is_empty());
    assert_eq!(export.settings.len(), 1);
    assert_eq!(storage.list_notes(UserId(77), false).unwrap().len(), 1);
}
