use std::path::Path;

use planbot_core::dates::{parse_day_month, parse_duration};
use planbot_core::lexicon::looks_like_question;
use planbot_core::{CoreError, ProgressChange, UserId, parse_time};

use super::{EventRouter, Reply, UserRef};
use crate::dialogue::{LifePlanState, StoreSink};
use crate::error::{Result, ServiceError};
use crate::message::{
    self, LABEL_BACK_TO_MENU, LABEL_COLLAPSE, LABEL_FULL_MENU, LABEL_GOALS, LABEL_INBOX, LABEL_MONTH,
    LABEL_SECRETARY, LABEL_SETTINGS, LABEL_STATS, LABEL_TODAY, LABEL_WEEK, Message,
};
use crate::planner::{DueUpdate, parse_progress};
use crate::render;
use crate::secretary::ASK_PROMPT;
use crate::session::Pending;

const EMPTY_CANCELS: &str = "Пустой текст — отмена.";
const SAVED_TO_INBOX: &str = "Сохранено в инбокс";
const PROGRESS_RANGE: &str = "Введи число от 0 до 100.";
const LIFEPLAN_NUDGE: &str =
    "Давай определим твои жизненные цели — это основа всей системы! Ответь на несколько вопросов.";

impl EventRouter {
    pub(super) async fn on_command(&self, user: &UserRef, name: &str, args: &str) -> Result<Vec<Reply>> {
        let owner = user.user_id;
        tracing::debug!(%owner, command = name, "Command received");
        let planner = &self.planner;
        let replies = match name {
            "start" => return self.start(user),
            "today" => vec![Reply::Send(planner.today_view(owner)?)],
            "week" => vec![Reply::Send(planner.week_view(owner)?)],
            "month" => vec![Reply::Send(planner.month_view(owner)?)],
            "okr" => vec![Reply::Send(planner.goals_view(owner)?)],
            "inbox" => vec![Reply::Send(planner.inbox_view(owner)?)],
            "stats" => vec![Reply::Send(render::stats_root())],
            "settings" => self.settings(owner)?,
            "ai" => self.ask_secretary(owner),
            "add" | "free" => {
                if args.is_empty() {
                    vec![Reply::send(format!("Использование: /{name} <текст>"))]
                } else {
                    vec![Reply::Send(self.secretary.relay(args).await)]
                }
            },
            "reset_me" => {
                let removed = planner.reset(owner)?;
                self.sessions.clear(owner);
                tracing::info!(%owner, removed, "User data reset on request");
                vec![Reply::send("Все твои данные полностью удалены!\nБот сброшен. Введите /start для чистого теста.")]
            },
            "lifeplan" => self.start_life_plan(owner),
            "cancel" => {
                self.sessions.clear(owner);
                vec![Reply::send("Диалог отменён.")]
            },
            _ => vec![Reply::send(format!("Неизвестная команда: /{name}"))],
        };
        Ok(replies)
    }

    fn start(&self, user: &UserRef) -> Result<Vec<Reply>> {
        let owner = user.user_id;
        self.planner.remember_chat(owner, user.chat_id)?;
        if !self.planner.has_objectives(owner)? {
            let mut replies = vec![Reply::send(LIFEPLAN_NUDGE)];
            replies.extend(self.start_life_plan(owner));
            return Ok(replies);
        }
        let name = user.first_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("друг");
        let greeting = Message::with_keyboard(
            format!("Привет, {name}! 👋\nЭто твой личный планировщик. Выбирай раздел:"),
            message::quick_menu(),
        );
        if self.register_digest(owner, user.chat_id) {
            tracing::info!(%owner, "Daily inbox reminder registered");
        }
        Ok(vec![Reply::Send(greeting)])
    }

    fn start_life_plan(&self, owner: UserId) -> Vec<Reply> {
        let (state, first) = LifePlanState::start();
        self.sessions.put(owner, Pending::LifePlan(state));
        vec![Reply::Send(first)]
    }

    fn ask_secretary(&self, owner: UserId) -> Vec<Reply> {
        self.sessions.put(owner, Pending::AiQuestion);
        vec![Reply::send(ASK_PROMPT)]
    }

    fn settings(&self, owner: UserId) -> Result<Vec<Reply>> {
        Ok(vec![
            Reply::Send(Message::with_keyboard(LABEL_SETTINGS, message::settings_menu())),
            Reply::Send(self.planner.settings_view(owner)?),
        ])
    }

    /// Reply-keyboard labels; they work regardless of pending input.
    fn on_menu_label(&self, owner: UserId, label: &str) -> Result<Option<Vec<Reply>>> {
        let planner = &self.planner;
        let replies = match label {
            LABEL_TODAY => vec![Reply::Send(planner.today_view(owner)?)],
            LABEL_INBOX => vec![Reply::Send(planner.inbox_view(owner)?)],
            LABEL_WEEK => vec![Reply::Send(planner.week_view(owner)?)],
            LABEL_MONTH => vec![Reply::Send(planner.month_view(owner)?)],
            LABEL_GOALS => vec![Reply::Send(planner.goals_view(owner)?)],
            LABEL_STATS => vec![Reply::Send(render::stats_root())],
            LABEL_SETTINGS => self.settings(owner)?,
            LABEL_SECRETARY => self.ask_secretary(owner),
            LABEL_FULL_MENU => vec![Reply::Send(Message::with_keyboard("Полное меню:", message::main_menu()))],
            LABEL_COLLAPSE | LABEL_BACK_TO_MENU => {
                vec![Reply::Send(Message::with_keyboard("Главное меню:", message::quick_menu()))]
            },
            _ => return Ok(None),
        };
        Ok(Some(replies))
    }

    pub(super) async fn on_text(&self, user: &UserRef, text: &str) -> Result<Vec<Reply>> {
        let owner = user.user_id;
        if let Some(replies) = self.on_menu_label(owner, text)? {
            return Ok(replies);
        }
        match self.sessions.take(owner) {
            Some(pending) => {
                tracing::debug!(%owner, pending = pending.name(), "Routing text to pending input");
                self.on_pending(user, pending, text).await
            },
            None if text.is_empty() => Ok(Vec::new()),
            None if looks_like_question(text) => self.answer_question(user, text).await,
            None => {
                self.planner.add_note(owner, text)?;
                Ok(vec![Reply::send(SAVED_TO_INBOX)])
            },
        }
    }

    pub(super) async fn on_voice(&self, user: &UserRef, clip: &Path) -> Result<Vec<Reply>> {
        let transcript = self.transcriber.transcribe(clip).await?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Ok(vec![Reply::send("Не удалось распознать речь 🤷")]);
        }
        tracing::debug!(owner = %user.user_id, chars = transcript.chars().count(), "Voice transcribed");
        self.on_text(user, transcript).await
    }

    async fn answer_question(&self, user: &UserRef, question: &str) -> Result<Vec<Reply>> {
        let answer = self.secretary.answer(&self.planner, user.user_id, question).await?;
        for task in &answer.scheduled {
            self.schedule_task_reminders(user, task);
        }
        Ok(answer.replies.into_iter().map(Reply::Send).collect())
    }

    async fn on_pending(&self, user: &UserRef, pending: Pending, text: &str) -> Result<Vec<Reply>> {
        let owner = user.user_id;
        let planner = &self.planner;
        let replies = match pending {
            Pending::LifePlan(state) => {
                let mut sink = StoreSink::new(planner.storage(), owner);
                let advance = self.dialogue.advance(state, text, &mut sink).await;
                match advance.state {
                    Some(next) => self.sessions.put(owner, Pending::LifePlan(next)),
                    None => tracing::info!(%owner, "Life-plan dialogue finished"),
                }
                advance.replies.into_iter().map(Reply::Send).collect()
            },
            Pending::AiQuestion => return self.answer_question(user, text).await,

            Pending::TodoText { category_id } => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                self.sessions.put(owner, Pending::TodoStart { text: text.to_owned(), category_id });
                vec![Reply::send("Время начала? (HH:MM)")]
            },
            Pending::TodoStart { text: task_text, category_id } => match parse_time(text) {
                Some(start) => {
                    self.sessions.put(owner, Pending::TodoDuration { text: task_text, start, category_id });
                    vec![Reply::send("Сколько минут займёт задача? (или в формате ЧЧ:ММ)")]
                },
                None => {
                    self.sessions.put(owner, Pending::TodoStart { text: task_text, category_id });
                    vec![Reply::send("Формат времени HH:MM, попробуй ещё раз.")]
                },
            },
            Pending::TodoDuration { text: task_text, start, category_id } => match parse_duration(text) {
                Ok(minutes) => {
                    let task = planner.add_day_task(owner, &task_text, start, minutes, category_id)?;
                    self.schedule_task_reminders(user, &task);
                    let mut replies = vec![Reply::Send(render::task_added(task.id, start, minutes))];
                    if let Some(uncovered) = planner.coverage_gap(owner)? {
                        replies.push(Reply::send("Добавь задачу ещё по другой категории. Выбери категорию:"));
                        replies.push(Reply::Send(render::category_picker(&uncovered)));
                    }
                    replies
                },
                Err(e) => {
                    self.sessions.put(owner, Pending::TodoDuration { text: task_text, start, category_id });
                    match e {
                        CoreError::InvalidInput(_) => vec![Reply::send("Длительность должна быть от 1 до 720 минут.")],
                        CoreError::Parse(_) => vec![Reply::send("Введите число минут или в формате ЧЧ:ММ.")],
                    }
                },
            },
            Pending::EditTask { task_id } => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                let changed = planner.edit_task_text(owner, task_id, text)?;
                let notice = if changed { "Текст задачи обновлён ✏️" } else { "Текст задачи не изменён." };
                vec![Reply::send(notice), Reply::Send(planner.today_view(owner)?)]
            },
            Pending::WeekText => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                planner.add_week_task(owner, text)?;
                vec![Reply::send("Задача добавлена на неделю!"), Reply::Send(planner.week_view(owner)?)]
            },
            Pending::MonthText => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                planner.add_month_task(owner, text)?;
                vec![Reply::send("Задача добавлена на месяц!"), Reply::Send(planner.month_view(owner)?)]
            },

            Pending::GoalTitle => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS), Reply::Send(planner.goals_view(owner)?)]);
                }
                let objective = planner.add_objective(owner, text)?;
                self.sessions.put(owner, Pending::StageTitle { goal_id: objective.id });
                vec![Reply::send(format!(
                    "🎯 Цель «{}» создана!\nВведите название первого этапа (шаг к цели):",
                    objective.title
                ))]
            },
            Pending::GoalDue { objective_id } => self.goal_due(owner, objective_id, text)?,
            Pending::StageTitle { goal_id } => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                self.sessions.put(owner, Pending::StageMonth { goal_id, title: text.to_owned() });
                vec![Reply::Send(render::month_picker())]
            },
            pending @ Pending::StageMonth { .. } => {
                self.sessions.put(owner, pending);
                vec![Reply::Send(render::month_picker())]
            },
            Pending::WeekTargetTitle { stage_id } => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                planner.add_week_target(owner, stage_id, text)?;
                vec![Reply::send(format!("Цель недели «{text}» добавлена!")), Reply::Send(planner.week_view(owner)?)]
            },
            Pending::KrTitle { objective_id, quarter } => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                self.sessions.put(owner, Pending::KrInitialProgress { objective_id, quarter, title: text.to_owned() });
                vec![Reply::send("Стартовый прогресс КР (0‑100)?")]
            },
            Pending::KrInitialProgress { objective_id, quarter, title } => match parse_progress(text) {
                Some(progress) => {
                    let kr = planner.add_key_result(owner, objective_id, quarter, &title, progress)?;
                    tracing::info!(%owner, kr_id = kr.id, objective_id, "Key result added");
                    vec![
                        Reply::send(format!("КР «{}» добавлен: {}%", kr.title, kr.progress)),
                        Reply::Send(planner.key_results_view(owner, objective_id, quarter)?),
                    ]
                },
                None => {
                    self.sessions.put(owner, Pending::KrInitialProgress { objective_id, quarter, title });
                    vec![Reply::send(PROGRESS_RANGE)]
                },
            },
            Pending::KrProgress { kr_id } => match parse_progress(text) {
                Some(progress) => match planner.key_result(owner, kr_id)? {
                    Some(_) => {
                        let kr = planner.change_kr_progress(owner, kr_id, ProgressChange::Set(i32::from(progress)))?;
                        vec![
                            Reply::send(format!("Прогресс КР обновлён: {progress}%")),
                            Reply::Send(planner.key_results_view(owner, kr.objective_id, kr.quarter)?),
                        ]
                    },
                    None => vec![Reply::send("КР не найден.")],
                },
                None => {
                    self.sessions.put(owner, Pending::KrProgress { kr_id });
                    vec![Reply::send(PROGRESS_RANGE)]
                },
            },

            Pending::InboxText => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                planner.add_note(owner, text)?;
                vec![Reply::send(SAVED_TO_INBOX), Reply::Send(planner.inbox_view(owner)?)]
            },
            Pending::EditNote { note_id } => {
                if text.is_empty() {
                    return Ok(vec![Reply::send(EMPTY_CANCELS)]);
                }
                let changed = planner.edit_note(owner, note_id, text)?;
                let notice = if changed { "Заметка обновлена ✏️" } else { "Заметка не изменена." };
                vec![Reply::send(notice), Reply::Send(planner.note_view(owner, note_id)?)]
            },
            Pending::NoteTaskDate { note_id } => match parse_day_month(text, planner.today()) {
                Some(due) => {
                    planner.note_to_task(owner, note_id, due)?;
                    vec![
                        Reply::send(format!("Задача добавлена на {}!", due.format("%d.%m"))),
                        Reply::Send(planner.inbox_view(owner)?),
                    ]
                },
                None => {
                    self.sessions.put(owner, Pending::NoteTaskDate { note_id });
                    vec![Reply::send("Формат даты DD.MM, попробуй ещё раз.")]
                },
            },
        };
        Ok(replies)
    }

    fn goal_due(&self, owner: UserId, objective_id: i64, text: &str) -> Result<Vec<Reply>> {
        let planner = &self.planner;
        let notice = match planner.set_objective_due(owner, objective_id, text)? {
            DueUpdate::Kept => "Срок не изменён.".to_owned(),
            DueUpdate::Invalid => {
                self.sessions.put(owner, Pending::GoalDue { objective_id });
                return Ok(vec![Reply::send("Не понял срок. Формат: Qx-YYYY или DD.MM.YYYY.")]);
            },
            DueUpdate::Changed { objective, within_year } => {
                let due = objective.due.map(|d| d.to_string()).unwrap_or_default();
                if within_year {
                    format!("Срок обновлён: ⏳{due}")
                } else {
                    format!("Срок обновлён: ⏳{due}\n⚠️ Срок дальше чем через год. Может, стоит разбить цель на этапы?")
                }
            },
        };
        let view = planner
            .quarters_view(owner, objective_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("objective {objective_id}")))?;
        Ok(vec![Reply::send(notice), Reply::Send(view)])
    }
}
