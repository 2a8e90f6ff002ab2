use std::sync::Arc;

use chrono::{NaiveTime, TimeDelta};
use planbot_core::UserId;
use planbot_llm::Completer;
use serde_json::json;

use super::{FakeCompleter, Harness, harness};
use crate::secretary::{Secretary, THINKING, build_context, find_matching_tasks, question_prompt, scheduled_answer};

const OWNER: UserId = UserId(11);

fn secretary(h: &Harness) -> Secretary {
    Secretary::new(Arc::clone(&h.completer) as Arc<dyn Completer>)
}

#[expect(clippy::unwrap_used, reason = "test code")]
fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn matching_ignores_stop_words_and_case() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let today = planner.today();
    planner.add_task_on(OWNER, "Позвонить Маме", today + TimeDelta::days(2)).unwrap();
    planner.add_task_on(OWNER, "Купить хлеб", today).unwrap();
    planner.add_task_on(OWNER, "Позвонить в банк", today + TimeDelta::days(45)).unwrap();

    let found = find_matching_tasks(&h.storage, OWNER, "Когда у меня позвонить?", today).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text, "Позвонить Маме");

    assert!(find_matching_tasks(&h.storage, UserId(99), "позвонить", today).unwrap().is_empty());
}

#[test]
fn scheduled_answer_marks_untimed_tasks() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    let timed = planner.add_day_task(OWNER, "Зал", time(18, 0), 60, None).unwrap();
    let untimed = planner.add_task_on(OWNER, "Отчёт", planner.today()).unwrap();

    let text = scheduled_answer(&[timed, untimed]).text;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("📌 Запланировано:"));
    assert!(lines.next().unwrap().ends_with("18:00–19:00 Зал"));
    assert!(lines.next().unwrap().contains("(без времени) Отчёт"));
}

#[test]
fn context_lists_tasks_and_goals() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    assert!(build_context(&[], &[]).contains("## upcoming_tasks (next 30 days)\nnone"));

    let task = planner.add_task_on(OWNER, "Run", planner.today()).unwrap();
    let goal = planner.add_objective(OWNER, "Marathon").unwrap();
    let context = build_context(&[task], &[goal]);
    assert!(context.starts_with("You are a personal planning assistant."));
    assert!(context.contains("🔸"));
    assert!(context.contains("· Run"));
    assert!(context.contains("• Marathon (deadline: N/A)"));

    let prompt = question_prompt(&context, "What next?");
    assert!(prompt.ends_with("\n\n## user-question\nWhat next?"));
}

#[tokio::test]
async fn known_task_is_answered_without_completer() {
    let h = harness(FakeCompleter::new());
    let planner = h.router.planner();
    planner.add_task_on(OWNER, "Стоматолог", planner.today() + TimeDelta::days(3)).unwrap();

    let answer = secretary(&h).answer(planner, OWNER, "Когда стоматолог?").await.unwrap();
    assert_eq!(answer.replies.len(), 1);
    assert!(answer.replies[0].text.starts_with("📌 Запланировано:"));
    assert!(h.completer.prompts().is_empty());
}

#[tokio::test]
async fn slot_in_reply_becomes_a_task() {
    let h = harness(FakeCompleter::new().text("Предлагаю завтра 10:00-11:30 Созвон с командой"));
    let planner = h.router.planner();

    let answer = secretary(&h).answer(planner, OWNER, "Найди время для созвона").await.unwrap();
    assert_eq!(answer.replies[0].text, THINKING);

    let tomorrow = planner.today() + TimeDelta::days(1);
    assert_eq!(
        answer.replies[1].text,
        format!("🆕 Задача создана: Созвон с командой — {tomorrow} 10:00–11:30")
    );
    assert_eq!(answer.scheduled.len(), 1);
    let task = &answer.scheduled[0];
    assert_eq!(task.due, tomorrow);
    assert_eq!(task.duration_minutes, Some(90));

    let prompt = &h.completer.prompts()[0];
    assert!(prompt.contains("## user-question\nНайди время для созвона"));
}

#[tokio::test]
async fn plain_reply_is_relayed() {
    let h = harness(FakeCompleter::new().text("Отдохни сегодня."));
    let answer = secretary(&h).answer(h.router.planner(), OWNER, "Что делать?").await.unwrap();
    assert_eq!(answer.replies.last().unwrap().text, "Отдохни сегодня.");
    assert!(answer.scheduled.is_empty());
}

#[tokio::test]
async fn create_tasks_action_adds_untimed_tasks() {
    let h = harness(FakeCompleter::new().json(json!({
        "action": "create_tasks",
        "tasks": [
            {"date": "2030-05-01", "text": "Подать документы"},
            {"date": "not a date", "text": "Пропустить"},
            {"date": "2030-05-02", "text": "Забрать паспорт"}
        ]
    })));
    let planner = h.router.planner();

    let answer = secretary(&h).answer(planner, OWNER, "Распланируй визу").await.unwrap();
    let texts: Vec<&str> = answer.replies.iter().map(|m| m.text.as_str()).collect();
    assert!(texts[1].starts_with("Ответ ассистента:\n{"));
    assert_eq!(texts[2], "Новые задачи созданы ✅");
    assert!(answer.scheduled.is_empty());

    let tasks = h.storage.all_tasks(OWNER).unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.start_ts.is_none()));
}

#[tokio::test]
async fn create_tasks_without_valid_items_claims_nothing() {
    let h = harness(FakeCompleter::new().json(json!({
        "action": "create_tasks",
        "tasks": [{"date": "31.02", "text": "Сломанная дата"}, {"text": "Без даты"}]
    })));

    let answer = secretary(&h).answer(h.router.planner(), OWNER, "Распланируй визу").await.unwrap();
    assert!(answer.replies.iter().all(|m| m.text != "Новые задачи созданы ✅"));
    assert!(answer.replies.last().unwrap().text.starts_with("Ответ ассистента:"));
    assert!(h.storage.all_tasks(OWNER).unwrap().is_empty());
}

#[tokio::test]
async fn completer_failure_is_reported_inline() {
    let h = harness(FakeCompleter::new().failing());
    let answer = secretary(&h).answer(h.router.planner(), OWNER, "Что делать?").await.unwrap();
    assert!(answer.replies[1].text.starts_with("Ошибка AI:"));
}

#[tokio::test]
async fn relay_renders_structured_replies() {
    let h = harness(FakeCompleter::new().json(json!({"ok": true})).failing());
    let secretary = secretary(&h);
    assert!(secretary.relay("ping").await.text.contains("\"ok\""));
    assert!(secretary.relay("ping").await.text.starts_with("Ошибка AI:"));
}
