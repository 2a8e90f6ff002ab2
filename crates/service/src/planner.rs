//! Store-backed planner operations behind the buttons and text prompts.
//!
//! Every method is scoped to one owner and reads "today" from the user
//! clock, so views and due dates follow the user's time zone.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike as _, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use planbot_core::constants::{KR_PROGRESS_MAX, MIN_COVERED_CATEGORIES, NOTE_TO_OBJECTIVE_CHARS};
use planbot_core::dates::{due_within_year, first_day_of_month, monday_of_week, next_monday};
use planbot_core::json_utils::truncate_chars;
use planbot_core::{
    Category, CoreError, DailyStat, InboxNote, KeyResult, NewTask, Objective, ProgressChange,
    Quarter, Task, TaskLevel, TaskPatch, TaskStatus, UserId, parse_due,
};
use planbot_storage::Storage;
use serde_json::Value;

use crate::clock::UserClock;
use crate::error::{Result, ServiceError};
use crate::message::Message;
use crate::render;

/// Setting key of the evening inbox digest toggle.
pub const DIGEST_SETTING: &str = "inbox_reminder";

/// Input that leaves a text field unchanged.
const KEEP_MARKER: &str = "-";

/// Renderable sections, addressable by name from the HTTP bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Today,
    Week,
    Month,
    Goals,
    Inbox,
    Stats,
}

impl ViewKind {
    pub const ALL: [Self; 6] = [Self::Today, Self::Week, Self::Month, Self::Goals, Self::Inbox, Self::Stats];

    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Goals => "goals",
            Self::Inbox => "inbox",
            Self::Stats => "stats",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown view: {s}")))
    }
}

/// Result of a "new deadline" answer.
#[derive(Debug, Clone, PartialEq)]
pub enum DueUpdate {
    Kept,
    Changed { objective: Objective, within_year: bool },
    Invalid,
}

/// Parse an absolute KR progress answer (`0..=100`).
pub fn parse_progress(input: &str) -> Option<u8> {
    input.trim().parse::<u8>().ok().filter(|p| *p <= KR_PROGRESS_MAX)
}

pub struct PlannerService {
    storage: Arc<Storage>,
    clock: UserClock,
}

impl PlannerService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>, clock: UserClock) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub const fn clock(&self) -> UserClock {
        self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // Views

    pub fn view(&self, owner: UserId, kind: ViewKind) -> Result<Message> {
        match kind {
            ViewKind::Today => self.today_view(owner),
            ViewKind::Week => self.week_view(owner),
            ViewKind::Month => self.month_view(owner),
            ViewKind::Goals => self.goals_view(owner),
            ViewKind::Inbox => self.inbox_view(owner),
            ViewKind::Stats => Ok(render::stats_today(&self.today_stat(owner)?)),
        }
    }

    pub fn today_view(&self, owner: UserId) -> Result<Message> {
        let tasks = self.storage.tasks_due(owner, self.today(), TaskLevel::Day)?;
        Ok(render::today_view(&tasks))
    }

    pub fn week_view(&self, owner: UserId) -> Result<Message> {
        let monday = monday_of_week(self.today());
        let tasks = self.storage.tasks_due(owner, monday, TaskLevel::Week)?;
        let targets = self.storage.week_targets(owner, monday)?;
        Ok(render::week_view(&tasks, &targets))
    }

    pub fn month_view(&self, owner: UserId) -> Result<Message> {
        let today = self.today();
        let stages = self.storage.stages_for_month(owner, today.month(), today.year())?;
        let goals = self.storage.list_objectives(owner)?;
        let tasks = self.storage.tasks_due(owner, first_day_of_month(today), TaskLevel::Month)?;
        Ok(render::month_view(today.month(), &stages, &goals, &tasks))
    }

    pub fn goals_view(&self, owner: UserId) -> Result<Message> {
        Ok(render::goals_view(&self.storage.okr_tree(owner)?))
    }

    pub fn quarters_view(&self, owner: UserId, objective_id: i64) -> Result<Option<Message>> {
        Ok(self.storage.get_objective(owner, objective_id)?.map(|obj| render::quarters_view(&obj)))
    }

    pub fn key_results_view(&self, owner: UserId, objective_id: i64, quarter: Quarter) -> Result<Message> {
        let objective = self.storage.get_objective(owner, objective_id)?;
        let krs = match objective {
            Some(_) => self.storage.key_results_for(owner, objective_id, Some(quarter))?,
            None => Vec::new(),
        };
        Ok(render::key_results_view(objective_id, objective.as_ref(), quarter, &krs))
    }

    pub fn inbox_view(&self, owner: UserId) -> Result<Message> {
        Ok(render::inbox_view(&self.storage.list_notes(owner, false)?))
    }

    pub fn note_view(&self, owner: UserId, note_id: i64) -> Result<Message> {
        let note = self.storage.get_note(owner, note_id)?;
        Ok(render::note_view(note_id, note.as_ref(), self.clock.offset()))
    }

    fn today_stat(&self, owner: UserId) -> Result<DailyStat> {
        let today = self.today();
        let tasks = self.storage.tasks_due(owner, today, TaskLevel::Day)?;
        let done = tasks.iter().filter(|t| t.done).count();
        Ok(DailyStat {
            owner,
            date: today,
            done: u32::try_from(done).unwrap_or(u32::MAX),
            total: u32::try_from(tasks.len()).unwrap_or(u32::MAX),
        })
    }

    /// Today's totals; the stat row is upserted on every render.
    pub fn stats_today(&self, owner: UserId) -> Result<Message> {
        let stat = self.today_stat(owner)?;
        self.storage.record_daily_stat(&stat)?;
        Ok(render::stats_today(&stat))
    }

    pub fn settings_view(&self, owner: UserId) -> Result<Message> {
        Ok(render::settings_view(self.digest_enabled(owner)?))
    }

    // Tasks

    /// Timed day task for today; `start_ts`/`end_ts` are in the user's zone.
    pub fn add_day_task(
        &self,
        owner: UserId,
        text: &str,
        start: NaiveTime,
        duration_minutes: u32,
        category_id: Option<i64>,
    ) -> Result<Task> {
        let today = self.today();
        let start_ts = self
            .clock
            .at(today, start)
            .ok_or_else(|| ServiceError::InvalidInput(format!("no such local time: {start}")))?;
        let end_ts = start_ts + TimeDelta::minutes(i64::from(duration_minutes));
        let task = NewTask::new(owner, text, today, TaskLevel::Day)
            .with_times(Some(start_ts), Some(end_ts))
            .with_duration(duration_minutes)
            .with_category(category_id);
        let task = self.storage.insert_task(&task)?;
        tracing::info!(%owner, task_id = task.id, "Day task added");
        Ok(task)
    }

    /// Day task with an explicit slot, as produced by the secretary.
    pub fn add_slot_task(
        &self,
        owner: UserId,
        text: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Task> {
        let minutes = u32::try_from((end - start).num_minutes()).unwrap_or(0);
        let mut task = NewTask::new(owner, text, start.date_naive(), TaskLevel::Day).with_times(Some(start), Some(end));
        if minutes > 0 {
            task = task.with_duration(minutes);
        }
        Ok(self.storage.insert_task(&task)?)
    }

    /// Untimed day task on `due`.
    pub fn add_task_on(&self, owner: UserId, text: &str, due: NaiveDate) -> Result<Task> {
        Ok(self.storage.insert_task(&NewTask::new(owner, text, due, TaskLevel::Day))?)
    }

    pub fn add_week_task(&self, owner: UserId, text: &str) -> Result<Task> {
        let due = monday_of_week(self.today());
        Ok(self.storage.insert_task(&NewTask::new(owner, text, due, TaskLevel::Week))?)
    }

    pub fn add_month_task(&self, owner: UserId, text: &str) -> Result<Task> {
        let due = first_day_of_month(self.today());
        Ok(self.storage.insert_task(&NewTask::new(owner, text, due, TaskLevel::Month))?)
    }

    /// Replace the task text; `-` keeps it. Returns whether anything changed.
    pub fn edit_task_text(&self, owner: UserId, task_id: i64, input: &str) -> Result<bool> {
        let text = input.trim();
        if text == KEEP_MARKER {
            self.storage.require_task(owner, task_id)?;
            return Ok(false);
        }
        if text.is_empty() {
            return Err(ServiceError::InvalidInput("empty task text".to_owned()));
        }
        let patch = TaskPatch { text: Some(text.to_owned()), ..TaskPatch::default() };
        self.storage.update_task(owner, task_id, &patch)?;
        Ok(true)
    }

    /// Flip `done`; a linked key result moves up when the task became done and down otherwise.
    pub fn toggle_task(&self, owner: UserId, task_id: i64) -> Result<Task> {
        let task = self.storage.toggle_task_done(owner, task_id)?;
        if let Some(kr_id) = task.kr_id {
            let change = if task.done { ProgressChange::STEP_UP } else { ProgressChange::STEP_DOWN };
            self.nudge_linked_kr(owner, kr_id, change);
        }
        Ok(task)
    }

    pub fn push_week_task_to_today(&self, owner: UserId, task_id: i64) -> Result<Task> {
        Ok(self.storage.reschedule_task(owner, task_id, self.today(), TaskLevel::Day)?)
    }

    pub fn push_month_task_to_week(&self, owner: UserId, task_id: i64) -> Result<Task> {
        Ok(self.storage.reschedule_task(owner, task_id, monday_of_week(self.today()), TaskLevel::Week)?)
    }

    /// Move every open task of this week to next Monday.
    pub fn move_week_to_next(&self, owner: UserId) -> Result<usize> {
        let today = self.today();
        let moved = self.storage.move_open_week_tasks(owner, monday_of_week(today), next_monday(today))?;
        tracing::info!(%owner, moved, "Open week tasks moved to next week");
        Ok(moved)
    }

    pub fn link_task_to_goal(&self, owner: UserId, task_id: i64, goal_id: i64) -> Result<Task> {
        self.storage.require_objective(owner, goal_id)?;
        let patch = TaskPatch { goal_id: Some(goal_id), ..TaskPatch::default() };
        Ok(self.storage.update_task(owner, task_id, &patch)?)
    }

    pub fn confirm_start(&self, owner: UserId, task_id: i64) -> Result<()> {
        Ok(self.storage.set_task_status(owner, task_id, TaskStatus::Started)?)
    }

    /// Mark finished: status `done`, `done` flag flipped, linked KR raised.
    pub fn confirm_end(&self, owner: UserId, task_id: i64) -> Result<Task> {
        self.storage.set_task_status(owner, task_id, TaskStatus::Done)?;
        let task = self.storage.toggle_task_done(owner, task_id)?;
        if let Some(kr_id) = task.kr_id {
            self.nudge_linked_kr(owner, kr_id, ProgressChange::STEP_UP);
        }
        Ok(task)
    }

    pub fn task(&self, owner: UserId, task_id: i64) -> Result<Option<Task>> {
        Ok(self.storage.get_task(owner, task_id)?)
    }

    fn nudge_linked_kr(&self, owner: UserId, kr_id: i64, change: ProgressChange) {
        // A dangling KR link must not undo the task change itself.
        if let Err(e) = self.storage.change_kr_progress(owner, kr_id, change) {
            tracing::warn!(%owner, kr_id, error = %e, "Linked key result not updated");
        }
    }

    // Categories

    /// Categories without a task due today.
    pub fn uncovered_categories(&self, owner: UserId) -> Result<Vec<Category>> {
        let today = self.today();
        let mut uncovered = Vec::new();
        for category in self.storage.list_categories(owner)? {
            if self.storage.tasks_by_category(owner, category.id, today)?.is_empty() {
                uncovered.push(category);
            }
        }
        Ok(uncovered)
    }

    /// Uncovered categories when today spans fewer than two of at least two categories.
    pub fn coverage_gap(&self, owner: UserId) -> Result<Option<Vec<Category>>> {
        let total = self.storage.list_categories(owner)?.len();
        let uncovered = self.uncovered_categories(owner)?;
        let covered = total - uncovered.len();
        if covered < MIN_COVERED_CATEGORIES && total >= MIN_COVERED_CATEGORIES {
            Ok(Some(uncovered))
        } else {
            Ok(None)
        }
    }

    // OKR

    pub fn objectives(&self, owner: UserId) -> Result<Vec<Objective>> {
        Ok(self.storage.list_objectives(owner)?)
    }

    pub fn has_objectives(&self, owner: UserId) -> Result<bool> {
        Ok(!self.storage.list_objectives(owner)?.is_empty())
    }

    pub fn add_objective(&self, owner: UserId, title: &str) -> Result<Objective> {
        let objective = self.storage.insert_objective(owner, title, None)?;
        tracing::info!(%owner, objective_id = objective.id, "Objective created");
        Ok(objective)
    }

    pub fn objective(&self, owner: UserId, objective_id: i64) -> Result<Option<Objective>> {
        Ok(self.storage.get_objective(owner, objective_id)?)
    }

    pub fn set_objective_due(&self, owner: UserId, objective_id: i64, input: &str) -> Result<DueUpdate> {
        if input.trim() == KEEP_MARKER {
            return Ok(DueUpdate::Kept);
        }
        let Some(due) = parse_due(input) else {
            return Ok(DueUpdate::Invalid);
        };
        let objective = self.storage.set_objective_due(owner, objective_id, due)?;
        Ok(DueUpdate::Changed { objective, within_year: due_within_year(&due, self.today()) })
    }

    pub fn add_key_result(
        &self,
        owner: UserId,
        objective_id: i64,
        quarter: Quarter,
        title: &str,
        progress: u8,
    ) -> Result<KeyResult> {
        Ok(self.storage.insert_key_result(owner, objective_id, title, quarter, progress)?)
    }

    pub fn key_result(&self, owner: UserId, kr_id: i64) -> Result<Option<KeyResult>> {
        Ok(self.storage.get_key_result(owner, kr_id)?)
    }

    pub fn change_kr_progress(&self, owner: UserId, kr_id: i64, change: ProgressChange) -> Result<KeyResult> {
        Ok(self.storage.change_kr_progress(owner, kr_id, change)?)
    }

    /// Turn a key result into a task at `level` and mark it pinned.
    pub fn pin_key_result(&self, owner: UserId, kr_id: i64, level: TaskLevel) -> Result<Task> {
        let kr = self.storage.require_key_result(owner, kr_id)?;
        let today = self.today();
        let due = match level {
            TaskLevel::Month => first_day_of_month(today),
            TaskLevel::Week => monday_of_week(today),
            TaskLevel::Day => today,
        };
        let task = self.storage.insert_task(&NewTask::new(owner, kr.title, due, level).with_key_result(kr_id))?;
        self.storage.pin_key_result(owner, kr_id)?;
        Ok(task)
    }

    // Stages

    /// Stage in `month` of the current year.
    pub fn add_stage(&self, owner: UserId, goal_id: i64, title: &str, month: u32) -> Result<i64> {
        self.storage.require_objective(owner, goal_id)?;
        Ok(self.storage.insert_stage(owner, goal_id, title, month, self.today().year())?)
    }

    pub fn add_week_target(&self, owner: UserId, stage_id: i64, title: &str) -> Result<i64> {
        Ok(self.storage.insert_week_target(owner, stage_id, title, monday_of_week(self.today()))?)
    }

    // Inbox

    pub fn add_note(&self, owner: UserId, text: &str) -> Result<InboxNote> {
        Ok(self.storage.insert_note(owner, text)?)
    }

    pub fn note(&self, owner: UserId, note_id: i64) -> Result<Option<InboxNote>> {
        Ok(self.storage.get_note(owner, note_id)?)
    }

    /// Replace the note text; `-` keeps it.
    pub fn edit_note(&self, owner: UserId, note_id: i64, input: &str) -> Result<bool> {
        let text = input.trim();
        if text == KEEP_MARKER {
            self.storage.require_note(owner, note_id)?;
            return Ok(false);
        }
        self.storage.update_note_text(owner, note_id, text)?;
        Ok(true)
    }

    pub fn archive_note(&self, owner: UserId, note_id: i64) -> Result<()> {
        Ok(self.storage.archive_note(owner, note_id)?)
    }

    /// Promote a note to an objective titled with its first characters; the note is archived.
    pub fn note_to_objective(&self, owner: UserId, note_id: i64) -> Result<Objective> {
        let note = self.storage.require_note(owner, note_id)?;
        let objective = self.storage.insert_objective(owner, truncate_chars(&note.text, NOTE_TO_OBJECTIVE_CHARS), None)?;
        self.storage.archive_note(owner, note_id)?;
        Ok(objective)
    }

    /// Turn a note into a day task on `due`; the note is archived.
    pub fn note_to_task(&self, owner: UserId, note_id: i64, due: NaiveDate) -> Result<Task> {
        let note = self.storage.require_note(owner, note_id)?;
        let task = self.add_task_on(owner, &note.text, due)?;
        self.storage.archive_note(owner, note_id)?;
        Ok(task)
    }

    /// Non-archived notes created since local midnight.
    pub fn notes_created_today(&self, owner: UserId) -> Result<usize> {
        let today = self.today();
        let (Some(from), Some(to)) = (
            self.clock.at(today, NaiveTime::MIN),
            self.clock.at(today + TimeDelta::days(1), NaiveTime::MIN),
        ) else {
            return Ok(0);
        };
        Ok(self.storage.count_notes_created_between(owner, from.with_timezone(&Utc), to.with_timezone(&Utc))?)
    }

    // Settings

    pub fn digest_enabled(&self, owner: UserId) -> Result<bool> {
        Ok(self.storage.get_setting(owner, DIGEST_SETTING)?.and_then(|v| v.as_bool()).unwrap_or(true))
    }

    /// Flip the digest toggle and return the new state.
    pub fn toggle_digest(&self, owner: UserId) -> Result<bool> {
        let enabled = !self.digest_enabled(owner)?;
        self.storage.set_setting(owner, DIGEST_SETTING, &Value::Bool(enabled))?;
        Ok(enabled)
    }

    pub fn remember_chat(&self, owner: UserId, chat_id: i64) -> Result<()> {
        Ok(self.storage.remember_chat(owner, chat_id)?)
    }

    /// Remove all planning data of the owner.
    pub fn reset(&self, owner: UserId) -> Result<usize> {
        Ok(self.storage.reset_owner(owner)?)
    }
}
