use chrono::TimeDelta;
use planbot_core::{ProgressChange, Quarter, TaskLevel, UserId};

use super::{EventRouter, Reply, UserRef};
use crate::callback::{Callback, DayChoice};
use crate::error::Result;
use crate::message::{Button, Message};
use crate::reminders::ReminderJob;
use crate::render;
use crate::session::Pending;

const KR_NOT_FOUND: &str = "КР не найден.";
const NOTE_NOT_FOUND: &str = "Заметка не найдена.";
const SNOOZED: &str = "Напоминание отложено на 15 минут ⏰";

/// Replace the text of a rendered view, keeping its keyboard.
fn retitled(text: &str, view: Message) -> Message {
    Message { text: text.to_owned(), keyboard: view.keyboard }
}

impl EventRouter {
    pub(super) fn on_button(&self, user: &UserRef, payload: &str) -> Result<Vec<Reply>> {
        let Ok(callback) = payload.parse::<Callback>() else {
            tracing::warn!(owner = %user.user_id, payload, "Unknown button payload");
            return Ok(vec![Reply::send(format!("Нажата кнопка: {payload} (ещё не реализовано)"))]);
        };
        tracing::debug!(owner = %user.user_id, ?callback, "Button pressed");
        let owner = user.user_id;
        match callback {
            Callback::TodayAdd
            | Callback::TodayEdit(_)
            | Callback::TodayToggle(_)
            | Callback::TodayRefresh
            | Callback::ChooseCategory(_)
            | Callback::LinkSkip
            | Callback::LinkChooseGoal(_)
            | Callback::LinkGoal { .. } => self.today_button(owner, callback),

            Callback::WeekAdd
            | Callback::WeekToggle(_)
            | Callback::WeekPush(_)
            | Callback::WeekMoveNext
            | Callback::WeekRefresh
            | Callback::WeekTargetAdd(_) => self.week_button(owner, callback),

            Callback::MonthAdd
            | Callback::MonthToggle(_)
            | Callback::MonthPush(_)
            | Callback::MonthRefresh
            | Callback::MonthAddStage
            | Callback::StageGoal(_)
            | Callback::GoalAddStage(_)
            | Callback::StageMonth(_)
            | Callback::StageMonthDone => self.month_button(owner, callback),

            Callback::OkrAddGoal
            | Callback::OkrCancelGoal
            | Callback::OkrObjective(_)
            | Callback::OkrQuarter { .. }
            | Callback::OkrDue(_)
            | Callback::OkrBack
            | Callback::KrStep { .. }
            | Callback::KrProgress(_)
            | Callback::KrPin(_)
            | Callback::KrPinLevel { .. }
            | Callback::KrAdd { .. } => self.okr_button(owner, callback),

            Callback::InboxAdd
            | Callback::InboxNote(_)
            | Callback::InboxEdit(_)
            | Callback::InboxGoal(_)
            | Callback::InboxTask(_)
            | Callback::InboxArchive(_)
            | Callback::InboxBack
            | Callback::TaskDay { .. } => self.inbox_button(owner, callback),

            Callback::TaskStartOk(_)
            | Callback::TaskStartSnooze(_)
            | Callback::TaskEndOk(_)
            | Callback::TaskEndSnooze(_) => self.reminder_button(user, callback),

            Callback::StatsToday => Ok(vec![Reply::Edit(self.planner.stats_today(owner)?)]),
            Callback::StatsBack => Ok(vec![Reply::Edit(render::stats_root())]),
            Callback::SettingsDigest => {
                let enabled = self.planner.toggle_digest(owner)?;
                tracing::info!(%owner, enabled, "Inbox digest toggled");
                Ok(vec![Reply::Edit(render::settings_view(enabled))])
            },
        }
    }

    fn today_button(&self, owner: UserId, callback: Callback) -> Result<Vec<Reply>> {
        let planner = &self.planner;
        let replies = match callback {
            Callback::TodayAdd => {
                let uncovered = planner.uncovered_categories(owner)?;
                if uncovered.is_empty() {
                    self.sessions.put(owner, Pending::TodoText { category_id: None });
                    vec![Reply::edit("Введи текст задачи:")]
                } else {
                    vec![Reply::Edit(render::category_picker(&uncovered))]
                }
            },
            Callback::ChooseCategory(category_id) => {
                self.sessions.put(owner, Pending::TodoText { category_id });
                vec![Reply::edit("Введи текст задачи для этой категории:")]
            },
            Callback::TodayEdit(task_id) => {
                planner.storage().require_task(owner, task_id)?;
                self.sessions.put(owner, Pending::EditTask { task_id });
                vec![Reply::edit("Новый текст задачи? (оставь «-» чтобы не менять)")]
            },
            Callback::TodayToggle(task_id) => {
                planner.toggle_task(owner, task_id)?;
                vec![Reply::Edit(planner.today_view(owner)?)]
            },
            Callback::LinkSkip => vec![Reply::Edit(retitled("Ок, без привязки.", planner.today_view(owner)?))],
            Callback::LinkChooseGoal(task_id) => match planner.task(owner, task_id)? {
                Some(_) => vec![Reply::Edit(render::link_goal_picker(task_id, &planner.objectives(owner)?))],
                None => vec![Reply::edit("Нет задачи для привязки.")],
            },
            Callback::LinkGoal { task, goal } => {
                planner.link_task_to_goal(owner, task, goal)?;
                vec![Reply::edit("Задача привязана к цели! 🎯"), Reply::Send(planner.today_view(owner)?)]
            },
            _ => vec![Reply::Edit(planner.today_view(owner)?)],
        };
        Ok(replies)
    }

    fn week_button(&self, owner: UserId, callback: Callback) -> Result<Vec<Reply>> {
        let planner = &self.planner;
        match callback {
            Callback::WeekAdd => {
                self.sessions.put(owner, Pending::WeekText);
                return Ok(vec![Reply::edit("Введите текст задачи для этой недели:")]);
            },
            Callback::WeekTargetAdd(stage_id) => {
                self.sessions.put(owner, Pending::WeekTargetTitle { stage_id });
                return Ok(vec![Reply::edit("Введите цель недели для этого этапа:")]);
            },
            Callback::WeekToggle(task_id) => {
                planner.toggle_task(owner, task_id)?;
            },
            Callback::WeekPush(task_id) => {
                planner.push_week_task_to_today(owner, task_id)?;
            },
            Callback::WeekMoveNext => {
                planner.move_week_to_next(owner)?;
            },
            _ => {},
        }
        Ok(vec![Reply::Edit(planner.week_view(owner)?)])
    }

    fn month_button(&self, owner: UserId, callback: Callback) -> Result<Vec<Reply>> {
        let planner = &self.planner;
        match callback {
            Callback::MonthAdd => {
                self.sessions.put(owner, Pending::MonthText);
                return Ok(vec![Reply::edit("Введите текст задачи для месяца:")]);
            },
            Callback::MonthAddStage => {
                let goals = planner.objectives(owner)?;
                if goals.is_empty() {
                    return Ok(vec![Reply::edit("Сначала создай хотя бы одну цель!")]);
                }
                return Ok(vec![Reply::Edit(render::stage_goal_picker(&goals))]);
            },
            Callback::StageGoal(goal_id) | Callback::GoalAddStage(goal_id) => {
                self.sessions.put(owner, Pending::StageTitle { goal_id });
                return Ok(vec![Reply::edit("Введите название этапа:")]);
            },
            Callback::StageMonth(month) => return self.stage_month_chosen(owner, month),
            Callback::StageMonthDone => {
                if matches!(self.sessions.get(owner), Some(Pending::StageTitle { .. } | Pending::StageMonth { .. })) {
                    self.sessions.clear(owner);
                }
                return Ok(vec![Reply::edit("Добавление этапов завершено.")]);
            },
            Callback::MonthToggle(task_id) => {
                planner.toggle_task(owner, task_id)?;
            },
            Callback::MonthPush(task_id) => {
                planner.push_month_task_to_week(owner, task_id)?;
            },
            _ => {},
        }
        Ok(vec![Reply::Edit(planner.month_view(owner)?)])
    }

    fn stage_month_chosen(&self, owner: UserId, month: u32) -> Result<Vec<Reply>> {
        match self.sessions.take(owner) {
            Some(Pending::StageMonth { goal_id, title }) => {
                self.planner.add_stage(owner, goal_id, &title, month)?;
                tracing::info!(%owner, goal_id, month, "Stage added");
                Ok(vec![Reply::Edit(render::stage_added(&title, month, goal_id))])
            },
            other => {
                if let Some(pending) = other {
                    self.sessions.put(owner, pending);
                }
                Ok(vec![Reply::edit("Сначала введите название этапа.")])
            },
        }
    }

    fn okr_button(&self, owner: UserId, callback: Callback) -> Result<Vec<Reply>> {
        let planner = &self.planner;
        let replies = match callback {
            Callback::OkrAddGoal => {
                self.sessions.put(owner, Pending::GoalTitle);
                vec![Reply::Edit(Message::inline(
                    "Введите название новой цели:",
                    vec![vec![Button::new("❌ Отмена", &Callback::OkrCancelGoal)]],
                ))]
            },
            Callback::OkrCancelGoal => {
                if matches!(self.sessions.get(owner), Some(Pending::GoalTitle | Pending::GoalDue { .. })) {
                    self.sessions.clear(owner);
                }
                vec![Reply::Edit(retitled("Добавление цели отменено.", planner.goals_view(owner)?))]
            },
            Callback::OkrObjective(objective_id) => match planner.quarters_view(owner, objective_id)? {
                Some(view) => vec![Reply::Edit(view)],
                None => vec![Reply::edit("Цель не найдена.")],
            },
            Callback::OkrQuarter { objective, quarter } => {
                vec![Reply::Edit(planner.key_results_view(owner, objective, quarter)?)]
            },
            Callback::OkrDue(objective_id) => {
                if planner.objective(owner, objective_id)?.is_none() {
                    return Ok(vec![Reply::edit("Цель не найдена.")]);
                }
                self.sessions.put(owner, Pending::GoalDue { objective_id });
                vec![Reply::edit("Новый срок? (Qx-YYYY или DD.MM.YYYY, «-» чтобы оставить)")]
            },
            Callback::OkrBack => vec![Reply::Edit(planner.goals_view(owner)?)],
            Callback::KrStep { kr, delta } => match planner.key_result(owner, kr)? {
                Some(_) => {
                    let kr = planner.change_kr_progress(owner, kr, ProgressChange::Delta(delta))?;
                    vec![Reply::Edit(planner.key_results_view(owner, kr.objective_id, kr.quarter)?)]
                },
                None => vec![Reply::edit(KR_NOT_FOUND)],
            },
            Callback::KrProgress(kr_id) => match planner.key_result(owner, kr_id)? {
                Some(kr) => {
                    self.sessions.put(owner, Pending::KrProgress { kr_id });
                    vec![Reply::edit(format!(
                        "Текущий прогресс КР:\n«{}»\n\nСейчас: {}%\nВведи новый прогресс (0-100):",
                        kr.title, kr.progress
                    ))]
                },
                None => vec![Reply::edit(KR_NOT_FOUND)],
            },
            Callback::KrPin(kr_id) => match planner.key_result(owner, kr_id)? {
                Some(kr) => vec![Reply::Edit(render::pin_level_picker(&kr))],
                None => vec![Reply::edit(KR_NOT_FOUND)],
            },
            Callback::KrPinLevel { kr, level } => self.pin_key_result(owner, kr, level)?,
            Callback::KrAdd { objective, quarter } => self.start_key_result(owner, objective, quarter),
            _ => vec![Reply::Edit(planner.goals_view(owner)?)],
        };
        Ok(replies)
    }

    fn pin_key_result(&self, owner: UserId, kr_id: i64, level: TaskLevel) -> Result<Vec<Reply>> {
        if self.planner.key_result(owner, kr_id)?.is_none() {
            return Ok(vec![Reply::edit(KR_NOT_FOUND)]);
        }
        let task = self.planner.pin_key_result(owner, kr_id, level)?;
        tracing::info!(%owner, kr_id, task_id = task.id, %level, "Key result pinned");
        Ok(vec![Reply::edit(format!("Задача добавлена в {level}! 🔗 связана с КР."))])
    }

    fn start_key_result(&self, owner: UserId, objective_id: i64, quarter: Quarter) -> Vec<Reply> {
        self.sessions.put(owner, Pending::KrTitle { objective_id, quarter });
        vec![Reply::edit(format!("Введите текст КР для {quarter}:"))]
    }

    fn inbox_button(&self, owner: UserId, callback: Callback) -> Result<Vec<Reply>> {
        let planner = &self.planner;
        let replies = match callback {
            Callback::InboxAdd => {
                self.sessions.put(owner, Pending::InboxText);
                vec![Reply::edit("Напиши идею / заметку для инбокса:")]
            },
            Callback::InboxNote(note_id) => vec![Reply::Edit(planner.note_view(owner, note_id)?)],
            Callback::InboxEdit(note_id) => {
                if planner.note(owner, note_id)?.is_none() {
                    return Ok(vec![Reply::edit(NOTE_NOT_FOUND)]);
                }
                self.sessions.put(owner, Pending::EditNote { note_id });
                vec![Reply::edit("Новый текст заметки? (оставь «-» чтобы не менять)")]
            },
            Callback::InboxGoal(note_id) => {
                let head = match planner.note_to_objective(owner, note_id) {
                    Ok(objective) => {
                        tracing::info!(%owner, note_id, objective_id = objective.id, "Note promoted to objective");
                        Reply::edit(format!("Создана цель из заметки! ID цели: {}", objective.id))
                    },
                    Err(e) if e.is_not_found() => Reply::edit(NOTE_NOT_FOUND),
                    Err(e) => return Err(e),
                };
                vec![head, Reply::Send(planner.inbox_view(owner)?)]
            },
            Callback::InboxTask(note_id) => match planner.note(owner, note_id)? {
                Some(_) => vec![Reply::Edit(render::note_day_picker(note_id))],
                None => vec![Reply::edit(NOTE_NOT_FOUND)],
            },
            Callback::InboxArchive(note_id) => {
                planner.archive_note(owner, note_id)?;
                vec![Reply::edit("Запись перемещена в архив."), Reply::Send(planner.inbox_view(owner)?)]
            },
            Callback::TaskDay { note, choice } => {
                if planner.note(owner, note)?.is_none() {
                    return Ok(vec![Reply::edit(NOTE_NOT_FOUND)]);
                }
                match choice {
                    DayChoice::Tomorrow => {
                        planner.note_to_task(owner, note, planner.today() + TimeDelta::days(1))?;
                        vec![Reply::edit("Задача добавлена на завтра!")]
                    },
                    DayChoice::Ask => {
                        self.sessions.put(owner, Pending::NoteTaskDate { note_id: note });
                        vec![Reply::edit("Введите дату задачи (DD.MM):")]
                    },
                }
            },
            _ => vec![Reply::Edit(planner.inbox_view(owner)?)],
        };
        Ok(replies)
    }

    fn reminder_button(&self, user: &UserRef, callback: Callback) -> Result<Vec<Reply>> {
        let (owner, chat_id) = (user.user_id, user.chat_id);
        let replies = match callback {
            Callback::TaskStartOk(task_id) => {
                self.planner.confirm_start(owner, task_id)?;
                vec![Reply::edit("Старт подтверждён ✔️")]
            },
            Callback::TaskStartSnooze(task_id) => {
                self.snooze(ReminderJob::TaskStart { owner, chat_id, task_id });
                vec![Reply::edit(SNOOZED)]
            },
            Callback::TaskEndOk(task_id) => {
                self.planner.confirm_end(owner, task_id)?;
                vec![Reply::Edit(self.planner.today_view(owner)?)]
            },
            Callback::TaskEndSnooze(task_id) => {
                self.snooze(ReminderJob::TaskEnd { owner, chat_id, task_id });
                vec![Reply::edit(SNOOZED)]
            },
            _ => Vec::new(),
        };
        Ok(replies)
    }
}
