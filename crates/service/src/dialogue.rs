//! Life-plan onboarding dialogue.
//!
//! Five fixed questions, a completer-drafted goal summary the user confirms
//! or replaces, then collection of at least three priority categories.
//! [`LifePlanState::step`] is a pure transition; the completer call is
//! surfaced as [`StepOutcome::NeedsCompletion`] and awaited by
//! [`DialogueEngine`].

use std::sync::Arc;

use planbot_core::UserId;
use planbot_core::constants::MIN_CATEGORIES;
use planbot_core::lexicon::{is_affirmative, is_completion, is_negative};
use planbot_llm::{Completer, Completion, LlmError, prompts};
use planbot_storage::Storage;
use serde_json::Value;

use crate::error::Result;
use crate::message::{Keyboard, Message};

pub const QUESTIONS: [&str; 5] = [
    "Опиши, какой жизни ты хочешь достичь. Как выглядит твоя идеальная картина жизни?",
    "Что для тебя по-настоящему важно? (семья, свобода, здоровье, признание и т.д.)",
    "Где ты хотел бы жить, работать, что делать каждый день?",
    "Какие главные достижения ты бы хотел оставить после себя?",
    "Кто и что тебя окружает в идеальной жизни?",
];

const INTRO: &str = "Начнём стратегический диалог!\n";
const FORMULATING: &str = "Формулирую твои цели на основе ответов...";
const CONFIRM_PROMPT: &str = "Сохранить эти цели? (да/нет, либо пришли свой вариант формулировки)";
const GOALS_SAVED: &str = "Цели сохранены! Теперь они всегда доступны в разделе 'Цели'.";
const OWN_GOALS_SAVED: &str =
    "Твои формулировки целей сохранены! Теперь они всегда доступны в разделе 'Цели'.";
const CATEGORIES_PROMPT: &str = "Теперь назови 3–5 ключевых факторов (категорий), наличие которых обеспечит воплощение твоей мечты.\n\
Например: «Здоровье», «Свобода», «Проекты».\n\
Вводи по одной категории за сообщение, когда всё — напиши «Готово».";
pub const CANCELLED: &str = "Диалог отменён. Можно начать заново с /lifeplan.";
const TOO_FEW_CATEGORIES: &str = "Лучше указать хотя бы 3 категории!";
const CATEGORIES_SAVED: &str =
    "Категории сохранены!\nТеперь все твои задачи будут планироваться по этим приоритетам.";
const EMPTY_ANSWER: &str = "Пустой ответ не засчитан.";
const DUPLICATE_CATEGORY: &str = "Такая категория уже есть. Введи другую.";

fn technical_error(detail: &dyn std::fmt::Display) -> String {
    format!(
        "⚠️ Возникла техническая ошибка при обработке ответа. Пожалуйста, попробуй ещё раз или напиши /lifeplan.\nТех. детали: {detail}"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifePlanState {
    AskingQuestions { index: usize, answers: Vec<String> },
    AwaitingConfirmation { answers: Vec<String> },
    CollectingCategories { collected: Vec<String> },
}

/// Where accepted goals and categories are persisted.
pub trait GoalSink {
    fn save_goals(&mut self, titles: &[String]) -> Result<()>;
    fn save_categories(&mut self, titles: &[String]) -> Result<()>;
}

/// [`GoalSink`] writing objectives and categories for one owner.
pub struct StoreSink<'a> {
    storage: &'a Storage,
    owner: UserId,
}

impl<'a> StoreSink<'a> {
    pub const fn new(storage: &'a Storage, owner: UserId) -> Self {
        Self { storage, owner }
    }
}

impl GoalSink for StoreSink<'_> {
    fn save_goals(&mut self, titles: &[String]) -> Result<()> {
        for title in titles {
            self.storage.insert_objective(self.owner, title, None)?;
        }
        tracing::info!(owner = %self.owner, count = titles.len(), "Saved life-plan goals");
        Ok(())
    }

    fn save_categories(&mut self, titles: &[String]) -> Result<()> {
        for title in titles {
            self.storage.insert_category(self.owner, title, None)?;
        }
        tracing::info!(owner = %self.owner, count = titles.len(), "Saved categories");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionRequest {
    Summary { answers: Vec<String> },
    Extraction { answers: Vec<String> },
}

impl CompletionRequest {
    pub fn prompt(&self) -> String {
        match self {
            Self::Summary { answers } => prompts::goal_summary_prompt(answers),
            Self::Extraction { answers } => prompts::goal_extraction_prompt(answers),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Continue { next: LifePlanState, replies: Vec<Message> },
    NeedsCompletion { request: CompletionRequest, notice: Option<Message> },
    Finished { replies: Vec<Message> },
}

impl StepOutcome {
    fn stay(next: LifePlanState, reply: impl Into<String>) -> Self {
        Self::Continue { next, replies: vec![Message::text(reply)] }
    }

    fn finish(reply: impl Into<String>) -> Self {
        Self::Finished { replies: vec![Message::text(reply)] }
    }
}

impl LifePlanState {
    /// Initial state plus the first question; hides any reply keyboard.
    pub fn start() -> (Self, Message) {
        let first = Message::with_keyboard(format!("{INTRO}{}", QUESTIONS[0]), Keyboard::Remove);
        (Self::AskingQuestions { index: 0, answers: Vec::new() }, first)
    }

    pub fn step(self, input: &str, sink: &mut dyn GoalSink) -> StepOutcome {
        let text = input.trim();
        if text.is_empty() {
            return self.reprompt();
        }
        match self {
            Self::AskingQuestions { index, mut answers } => {
                answers.push(text.to_owned());
                let index = index.saturating_add(1);
                match QUESTIONS.get(index) {
                    Some(question) => {
                        StepOutcome::stay(Self::AskingQuestions { index, answers }, *question)
                    },
                    None => StepOutcome::NeedsCompletion {
                        request: CompletionRequest::Summary { answers },
                        notice: Some(Message::text(FORMULATING)),
                    },
                }
            },
            Self::AwaitingConfirmation { answers } => {
                if is_affirmative(text) {
                    return StepOutcome::NeedsCompletion {
                        request: CompletionRequest::Extraction { answers },
                        notice: None,
                    };
                }
                if is_negative(text) {
                    return StepOutcome::finish(CANCELLED);
                }
                let goals = goal_lines(text);
                if let Err(e) = sink.save_goals(&goals) {
                    tracing::error!(error = %e, goals = ?goals, "Failed to save user goals");
                    return StepOutcome::finish(technical_error(&e));
                }
                collect_categories(OWN_GOALS_SAVED)
            },
            Self::CollectingCategories { mut collected } => {
                if is_completion(text) {
                    if collected.len() < MIN_CATEGORIES {
                        return StepOutcome::stay(Self::CollectingCategories { collected }, TOO_FEW_CATEGORIES);
                    }
                    return match sink.save_categories(&collected) {
                        Ok(()) => StepOutcome::finish(CATEGORIES_SAVED),
                        Err(e) => {
                            tracing::error!(error = %e, categories = ?collected, "Failed to save categories");
                            StepOutcome::finish(technical_error(&e))
                        },
                    };
                }
                if collected.iter().any(|c| c == text) {
                    return StepOutcome::stay(Self::CollectingCategories { collected }, DUPLICATE_CATEGORY);
                }
                collected.push(text.to_owned());
                StepOutcome::stay(
                    Self::CollectingCategories { collected },
                    format!("Добавлено: {text}\nВведи ещё категорию или напиши «Готово»."),
                )
            },
        }
    }

    /// Repeat the current prompt without advancing.
    fn reprompt(self) -> StepOutcome {
        let prompt = match &self {
            Self::AskingQuestions { index, .. } => QUESTIONS.get(*index).copied().unwrap_or(CONFIRM_PROMPT),
            Self::AwaitingConfirmation { .. } => CONFIRM_PROMPT,
            Self::CollectingCategories { .. } => "Введи категорию или напиши «Готово».",
        };
        StepOutcome::Continue { next: self, replies: vec![Message::text(EMPTY_ANSWER), Message::text(prompt)] }
    }

    /// Continue after the completer answered (or failed) a request from [`Self::step`].
    ///
    /// Completer failures are terminal: the user gets the technical detail and
    /// has to restart with `/lifeplan`.
    pub fn resume(
        request: CompletionRequest,
        result: std::result::Result<Completion, LlmError>,
        sink: &mut dyn GoalSink,
    ) -> StepOutcome {
        match (request, result) {
            (CompletionRequest::Summary { answers }, Ok(summary)) => StepOutcome::Continue {
                next: Self::AwaitingConfirmation { answers },
                replies: vec![
                    Message::text(format!("Вариант целей:\n{}", summary.render())),
                    Message::text(CONFIRM_PROMPT),
                ],
            },
            (CompletionRequest::Summary { answers }, Err(e)) => {
                tracing::error!(
                    error = %e,
                    index = answers.len(),
                    answers = ?answers,
                    input = answers.last().map_or("", String::as_str),
                    question_count = QUESTIONS.len(),
                    "Life-plan summary failed"
                );
                StepOutcome::finish(technical_error(&e))
            },
            (CompletionRequest::Extraction { .. }, Ok(reply)) => {
                let goals = goals_from_completion(&reply);
                if let Err(e) = sink.save_goals(&goals) {
                    tracing::error!(error = %e, goals = ?goals, "Failed to save extracted goals");
                    return StepOutcome::finish(technical_error(&e));
                }
                collect_categories(GOALS_SAVED)
            },
            (CompletionRequest::Extraction { answers }, Err(e)) => {
                tracing::error!(error = %e, answers = ?answers, "Life-plan goal extraction failed");
                StepOutcome::finish(technical_error(&e))
            },
        }
    }
}

fn collect_categories(saved_notice: &str) -> StepOutcome {
    StepOutcome::Continue {
        next: LifePlanState::CollectingCategories { collected: Vec::new() },
        replies: vec![Message::text(saved_notice), Message::text(CATEGORIES_PROMPT)],
    }
}

/// One goal per non-empty line, stripped of bullets and dashes.
pub fn goal_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '–' | '•' | '-')))
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Goals from the extraction reply: text lines, a JSON array of strings, or
/// an object with a `goals` array. Anything else yields no goals.
pub fn goals_from_completion(reply: &Completion) -> Vec<String> {
    let items = match reply {
        Completion::Text(text) => return goal_lines(text),
        Completion::Structured(Value::Array(items)) => items,
        Completion::Structured(Value::Object(map)) => match map.get("goals") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("Structured goal reply without a goals array, nothing saved");
                return Vec::new();
            },
        },
        Completion::Structured(_) => return Vec::new(),
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .flat_map(goal_lines)
        .collect()
}

/// Result of feeding one message to the dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    /// Successor state; `None` when the dialogue ended.
    pub state: Option<LifePlanState>,
    pub replies: Vec<Message>,
}

/// Runs [`LifePlanState`] transitions, awaiting the completer when asked to.
pub struct DialogueEngine {
    completer: Arc<dyn Completer>,
}

impl DialogueEngine {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    pub async fn advance(
        &self,
        state: LifePlanState,
        input: &str,
        sink: &mut (dyn GoalSink + Send),
    ) -> Advance {
        let mut replies = Vec::new();
        let mut outcome = state.step(input, sink);
        loop {
            match outcome {
                StepOutcome::Continue { next, replies: more } => {
                    replies.extend(more);
                    return Advance { state: Some(next), replies };
                },
                StepOutcome::Finished { replies: more } => {
                    replies.extend(more);
                    return Advance { state: None, replies };
                },
                StepOutcome::NeedsCompletion { request, notice } => {
                    replies.extend(notice);
                    let result = self.completer.complete(&request.prompt()).await;
                    outcome = LifePlanState::resume(request, result, sink);
                },
            }
        }
    }
}
