//! Free-form questions about the schedule.
//!
//! Known tasks are answered from the store without a completer call; other
//! questions go to the completer with a compact context of upcoming tasks
//! and goals, and a reply that names a slot becomes a task.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use planbot_core::constants::FUTURE_TASK_WINDOW_DAYS;
use planbot_core::lexicon::query_words;
use planbot_core::{Objective, Task, UserId, extract_slot};
use planbot_llm::{Completer, Completion, prompts};
use planbot_storage::Storage;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::message::Message;
use crate::planner::PlannerService;

pub const THINKING: &str = "Думаю… (это может занять несколько секунд) ⏳";
pub const ASK_PROMPT: &str = "🤖 Что спросить ассистента? Отправь текст одним сообщением.";
const TASKS_CREATED: &str = "Новые задачи созданы ✅";
const CREATE_TASKS_ACTION: &str = "create_tasks";

/// Tasks due in the next 30 days whose text contains a search word of `query`.
pub fn find_matching_tasks(storage: &Storage, owner: UserId, query: &str, today: NaiveDate) -> Result<Vec<Task>> {
    let words = query_words(query);
    if words.is_empty() {
        return Ok(Vec::new());
    }
    let until = today + TimeDelta::days(FUTURE_TASK_WINDOW_DAYS);
    let mut tasks: Vec<Task> = storage
        .tasks_between(owner, today, until)?
        .into_iter()
        .filter(|task| {
            let text = task.text.to_lowercase();
            words.iter().any(|w| text.contains(w.as_str()))
        })
        .collect();
    tasks.sort_by_key(Task::schedule_key);
    Ok(tasks)
}

/// `📌 Запланировано:` listing, one bullet per task.
pub fn scheduled_answer(tasks: &[Task]) -> Message {
    let lines: Vec<String> = tasks
        .iter()
        .map(|t| match t.time_span() {
            Some(span) => format!("• {} {span} {}", t.due, t.text),
            None => format!("• {} (без времени) {}", t.due, t.text),
        })
        .collect();
    Message::text(format!("📌 Запланировано:\n{}", lines.join("\n")))
}

/// Prompt fragment describing upcoming tasks and goals.
pub fn build_context(tasks: &[Task], objectives: &[Objective]) -> String {
    let tasks = if tasks.is_empty() {
        "none".to_owned()
    } else {
        tasks
            .iter()
            .map(|t| format!("{} {} · {}", if t.done { "✅" } else { "🔸" }, t.due, t.text))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let goals = if objectives.is_empty() {
        "none".to_owned()
    } else {
        objectives
            .iter()
            .map(|o| {
                let due = o.due.map_or_else(|| "N/A".to_owned(), |d| d.to_string());
                format!("• {} (deadline: {due})", o.title)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{}## upcoming_tasks (next 30 days)\n{tasks}\n## goals\n{goals}\n", prompts::CONTEXT_INTRO)
}

pub fn question_prompt(context: &str, question: &str) -> String {
    format!("{context}\n\n## user-question\n{question}")
}

#[derive(Debug, Deserialize)]
struct PlannedTask {
    date: NaiveDate,
    text: String,
}

/// Replies for the user plus timed tasks that need reminders.
#[derive(Debug, Default)]
pub struct Answer {
    pub replies: Vec<Message>,
    pub scheduled: Vec<Task>,
}

pub struct Secretary {
    completer: Arc<dyn Completer>,
}

impl Secretary {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    pub async fn answer(&self, planner: &PlannerService, owner: UserId, question: &str) -> Result<Answer> {
        let today = planner.today();
        let matches = find_matching_tasks(planner.storage(), owner, question, today)?;
        if !matches.is_empty() {
            tracing::debug!(%owner, matches = matches.len(), "Answered from stored tasks");
            return Ok(Answer { replies: vec![scheduled_answer(&matches)], scheduled: Vec::new() });
        }

        let mut answer = Answer { replies: vec![Message::text(THINKING)], scheduled: Vec::new() };
        let upcoming = planner
            .storage()
            .tasks_between(owner, today, today + TimeDelta::days(FUTURE_TASK_WINDOW_DAYS))?;
        let context = build_context(&upcoming, &planner.objectives(owner)?);

        match self.completer.complete(&question_prompt(&context, question)).await {
            Ok(Completion::Structured(value)) => Self::apply_structured(planner, owner, &value, &mut answer)?,
            Ok(Completion::Text(text)) => Self::apply_text(planner, owner, text, &mut answer)?,
            Err(e) => {
                tracing::error!(%owner, error = %e, "Secretary completion failed");
                answer.replies.push(Message::text(format!("Ошибка AI: {e}")));
            },
        }
        Ok(answer)
    }

    fn apply_structured(planner: &PlannerService, owner: UserId, value: &Value, answer: &mut Answer) -> Result<()> {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        answer.replies.push(Message::text(format!("Ответ ассистента:\n{pretty}")));
        if value.get("action").and_then(Value::as_str) != Some(CREATE_TASKS_ACTION) {
            return Ok(());
        }
        let planned = value.get("tasks").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
        let mut created = 0_usize;
        for item in planned {
            match serde_json::from_value::<PlannedTask>(item.clone()) {
                Ok(planned) => {
                    // Untimed, so nothing to remind about.
                    planner.add_task_on(owner, &planned.text, planned.date)?;
                    created += 1;
                },
                Err(e) => tracing::warn!(%owner, error = %e, "Skipping malformed planned task"),
            }
        }
        tracing::info!(%owner, created, "Tasks created from assistant reply");
        if created > 0 {
            answer.replies.push(Message::text(TASKS_CREATED));
        }
        Ok(())
    }

    fn apply_text(planner: &PlannerService, owner: UserId, text: String, answer: &mut Answer) -> Result<()> {
        let today = planner.today();
        let clock = planner.clock();
        let Some(slot) = extract_slot(&text, today) else {
            answer.replies.push(Message::text(text));
            return Ok(());
        };
        let (Some(start), Some(end)) = (clock.at(slot.date, slot.start), clock.at(slot.date, slot.end)) else {
            answer.replies.push(Message::text(text));
            return Ok(());
        };
        let task = planner.add_slot_task(owner, &slot.description, start, end)?;
        answer.replies.push(Message::text(format!(
            "🆕 Задача создана: {} — {} {}–{}",
            slot.description,
            slot.date,
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M")
        )));
        if slot.date == today {
            answer.replies.push(planner.today_view(owner)?);
        }
        answer.scheduled.push(task);
        Ok(())
    }

    /// Send `text` to the completer and render whatever comes back.
    pub async fn relay(&self, text: &str) -> Message {
        match self.completer.complete(text).await {
            Ok(reply) => Message::text(reply.render()),
            Err(e) => {
                tracing::error!(error = %e, "Relay completion failed");
                Message::text(format!("Ошибка AI: {e}"))
            },
        }
    }
}
