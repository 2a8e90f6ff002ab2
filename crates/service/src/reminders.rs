//! Timed task reminders and the daily inbox digest.
//!
//! A [`Scheduler`] only decides *when*; fired jobs come back as
//! [`ReminderJob`] values and the transport asks the event router to turn
//! them into messages.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use planbot_core::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::clock::UserClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderJob {
    TaskStart { owner: UserId, chat_id: i64, task_id: i64 },
    TaskEnd { owner: UserId, chat_id: i64, task_id: i64 },
    InboxDigest { owner: UserId, chat_id: i64 },
}

impl ReminderJob {
    pub const fn chat_id(&self) -> i64 {
        match *self {
            Self::TaskStart { chat_id, .. } | Self::TaskEnd { chat_id, .. } | Self::InboxDigest { chat_id, .. } => {
                chat_id
            },
        }
    }
}

/// Name of the per-user daily digest job.
pub fn digest_job_name(owner: UserId) -> String {
    format!("inbox_reminder_{owner}")
}

/// Non-negative delay from `now` until `target`.
pub fn delay_until(target: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// Delay until the next occurrence of `at` in the user's zone (tomorrow if already past).
pub fn delay_until_daily(at: NaiveTime, now: DateTime<FixedOffset>) -> Duration {
    let today = now.date_naive().and_time(at);
    let next = if today > now.naive_local() { today } else { today + TimeDelta::days(1) };
    (next - now.naive_local()).to_std().unwrap_or(Duration::ZERO)
}

pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, job: ReminderJob);

    /// Register a daily job under `name`; returns `false` if the name is taken.
    fn schedule_daily(&self, name: &str, at: NaiveTime, job: ReminderJob) -> bool;

    fn has_job(&self, name: &str) -> bool;
}

/// Scheduler backed by tokio timers; fired jobs are delivered on a channel.
///
/// Must be used from inside a tokio runtime.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<ReminderJob>,
    daily: Mutex<HashSet<String>>,
    clock: UserClock,
}

impl TokioScheduler {
    pub fn new(clock: UserClock) -> (Self, mpsc::UnboundedReceiver<ReminderJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, daily: Mutex::new(HashSet::new()), clock }, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, job: ReminderJob) {
        tracing::debug!(?job, delay_secs = delay.as_secs(), "Scheduling reminder");
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(job).is_err() {
                tracing::warn!(?job, "Reminder fired after receiver closed");
            }
        });
    }

    fn schedule_daily(&self, name: &str, at: NaiveTime, job: ReminderJob) -> bool {
        if !self.daily.lock().unwrap_or_else(PoisonError::into_inner).insert(name.to_owned()) {
            return false;
        }
        tracing::info!(name, %at, "Registered daily reminder");
        let tx = self.tx.clone();
        let clock = self.clock;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay_until_daily(at, clock.now())).await;
                if tx.send(job).is_err() {
                    break;
                }
            }
        });
        true
    }

    fn has_job(&self, name: &str) -> bool {
        self.daily.lock().unwrap_or_else(PoisonError::into_inner).contains(name)
    }
}
