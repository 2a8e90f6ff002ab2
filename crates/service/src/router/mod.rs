//! Transport-neutral entry point: one [`ChatEvent`] in, replies out.
//!
//! Commands, reply-keyboard labels, inline buttons, free text and voice
//! clips all arrive here. Text is dispatched on the user's single
//! [`Pending`](crate::session::Pending) value; with nothing pending it is
//! either a question for the secretary or a new inbox note.

mod buttons;
mod text;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use planbot_core::constants::{INBOX_REMINDER_HOUR, SNOOZE_SECS};
use planbot_core::{Task, UserId};
use planbot_llm::Completer;
use planbot_speech::Transcriber;
use planbot_storage::Storage;
use serde::{Deserialize, Serialize};

use crate::clock::UserClock;
use crate::dialogue::DialogueEngine;
use crate::error::Result;
use crate::message::Message;
use crate::planner::{PlannerService, ViewKind};
use crate::reminders::{ReminderJob, Scheduler, delay_until, digest_job_name};
use crate::render;
use crate::secretary::Secretary;
use crate::session::SessionRegistry;

const NOT_FOUND: &str = "Запись не найдена.";

/// Who sent an event and where replies go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub user_id: UserId,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl UserRef {
    /// Private chat: the chat id equals the user id.
    pub const fn private(user_id: i64) -> Self {
        Self { user_id: UserId(user_id), chat_id: user_id, first_name: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventKind {
    /// `/name args`; `name` has no leading slash.
    Command {
        name: String,
        #[serde(default)]
        args: String,
    },
    Button {
        payload: String,
    },
    Text(String),
    /// Path of a downloaded voice clip.
    Voice(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub user: UserRef,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "message", rename_all = "snake_case")]
pub enum Reply {
    /// New message in the chat.
    Send(Message),
    /// Replace the message whose button was pressed.
    Edit(Message),
}

impl Reply {
    pub const fn message(&self) -> &Message {
        match self {
            Self::Send(message) | Self::Edit(message) => message,
        }
    }

    pub(crate) fn send(text: impl Into<String>) -> Self {
        Self::Send(Message::text(text))
    }

    pub(crate) fn edit(text: impl Into<String>) -> Self {
        Self::Edit(Message::text(text))
    }
}

pub struct EventRouter {
    planner: PlannerService,
    dialogue: DialogueEngine,
    secretary: Secretary,
    transcriber: Arc<dyn Transcriber>,
    scheduler: Arc<dyn Scheduler>,
    sessions: SessionRegistry,
}

impl EventRouter {
    pub fn new(
        storage: Arc<Storage>,
        completer: Arc<dyn Completer>,
        transcriber: Arc<dyn Transcriber>,
        scheduler: Arc<dyn Scheduler>,
        clock: UserClock,
    ) -> Self {
        Self {
            planner: PlannerService::new(storage, clock),
            dialogue: DialogueEngine::new(Arc::clone(&completer)),
            secretary: Secretary::new(completer),
            transcriber,
            scheduler,
            sessions: SessionRegistry::new(),
        }
    }

    pub const fn planner(&self) -> &PlannerService {
        &self.planner
    }

    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Process one event. Failures are logged and answered, never returned.
    pub async fn handle(&self, event: ChatEvent) -> Vec<Reply> {
        let ChatEvent { user, kind } = event;
        let result = match kind {
            EventKind::Command { name, args } => self.on_command(&user, &name, args.trim()).await,
            EventKind::Button { payload } => self.on_button(&user, &payload),
            EventKind::Text(text) => self.on_text(&user, text.trim()).await,
            EventKind::Voice(clip) => self.on_voice(&user, &clip).await,
        };
        match result {
            Ok(replies) => replies,
            Err(e) if e.is_not_found() => {
                tracing::debug!(owner = %user.user_id, error = %e, "Lookup miss");
                vec![Reply::send(NOT_FOUND)]
            },
            Err(e) => {
                tracing::error!(owner = %user.user_id, error = %e, "Event handling failed");
                self.sessions.clear(user.user_id);
                vec![Reply::send(format!("⚠️ Что-то пошло не так, попробуй ещё раз.\nТех. детали: {e}"))]
            },
        }
    }

    pub fn view(&self, owner: UserId, kind: ViewKind) -> Result<Message> {
        self.planner.view(owner, kind)
    }

    /// Message for a fired reminder, or `None` when there is nothing to say.
    pub fn fire(&self, job: &ReminderJob) -> Option<(i64, Message)> {
        match self.reminder_message(job) {
            Ok(message) => message.map(|m| (job.chat_id(), m)),
            Err(e) => {
                tracing::error!(?job, error = %e, "Reminder could not be rendered");
                None
            },
        }
    }

    fn reminder_message(&self, job: &ReminderJob) -> Result<Option<Message>> {
        match *job {
            ReminderJob::TaskStart { owner, task_id, .. } => {
                Ok(Some(render::start_reminder(task_id, &self.task_title(owner, task_id)?)))
            },
            ReminderJob::TaskEnd { owner, task_id, .. } => {
                Ok(Some(render::end_reminder(task_id, &self.task_title(owner, task_id)?)))
            },
            ReminderJob::InboxDigest { owner, .. } => {
                if !self.planner.digest_enabled(owner)? {
                    return Ok(None);
                }
                let count = self.planner.notes_created_today(owner)?;
                Ok((count > 0).then(|| render::inbox_digest(count)))
            },
        }
    }

    fn task_title(&self, owner: UserId, task_id: i64) -> Result<String> {
        Ok(self.planner.task(owner, task_id)?.map(|t| t.text).unwrap_or_default())
    }

    /// Register the daily inbox digest for every known chat; returns how many were new.
    pub fn restore_reminders(&self) -> Result<usize> {
        let chats = self.planner.storage().known_chats()?;
        let restored = chats.iter().filter(|chat| self.register_digest(chat.owner, chat.chat_id)).count();
        tracing::info!(known = chats.len(), restored, "Daily inbox reminders restored");
        Ok(restored)
    }

    fn register_digest(&self, owner: UserId, chat_id: i64) -> bool {
        let name = digest_job_name(owner);
        if self.scheduler.has_job(&name) {
            return false;
        }
        let at = NaiveTime::from_hms_opt(INBOX_REMINDER_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
        self.scheduler.schedule_daily(&name, at, ReminderJob::InboxDigest { owner, chat_id })
    }

    /// Start and end reminders for a timed task; untimed tasks are ignored.
    fn schedule_task_reminders(&self, user: &UserRef, task: &Task) {
        let (Some(start), Some(end)) = (task.start_ts, task.end_ts) else {
            return;
        };
        let now = self.planner.clock().now();
        let (owner, chat_id, task_id) = (user.user_id, user.chat_id, task.id);
        self.scheduler.schedule_once(delay_until(start, now), ReminderJob::TaskStart { owner, chat_id, task_id });
        self.scheduler.schedule_once(delay_until(end, now), ReminderJob::TaskEnd { owner, chat_id, task_id });
    }

    fn snooze(&self, job: ReminderJob) {
        self.scheduler.schedule_once(Duration::from_secs(SNOOZE_SECS), job);
    }
}
