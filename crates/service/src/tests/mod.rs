//! Fakes and fixtures shared by the service tests.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use planbot_llm::{Completer, Completion, LlmError};
use planbot_speech::{SpeechError, Transcriber};
use planbot_storage::Storage;
use tempfile::TempDir;

use crate::clock::UserClock;
use crate::reminders::{ReminderJob, Scheduler};
use crate::router::EventRouter;

mod planner_tests;
mod secretary_tests;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Arc<Storage>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = Storage::open_with_pool_size(&temp_dir.path().join("test.db"), 2).unwrap();
    (Arc::new(storage), temp_dir)
}

/// Completer answering from a script, one entry per call.
#[derive(Default)]
pub struct FakeCompleter {
    replies: Mutex<VecDeque<Option<Completion>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(Some(Completion::Text(reply.to_owned())));
        self
    }

    pub fn json(self, reply: serde_json::Value) -> Self {
        self.replies.lock().unwrap().push_back(Some(Completion::Structured(reply)));
        self
    }

    /// Next call fails with HTTP 503.
    pub fn failing(self) -> Self {
        self.replies.lock().unwrap().push_back(None);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for FakeCompleter {
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(LlmError::HttpStatus { code: 503, body: "unavailable".to_owned() }),
            None => Err(LlmError::EmptyResponse),
        }
    }
}

pub struct FakeTranscriber {
    pub transcript: String,
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _clip: &Path) -> Result<String, SpeechError> {
        Ok(self.transcript.clone())
    }
}

/// Scheduler that only records what it was asked to do.
#[derive(Default)]
pub struct RecordingScheduler {
    pub once: Mutex<Vec<(Duration, ReminderJob)>>,
    pub daily: Mutex<HashSet<String>>,
}

impl Scheduler for RecordingScheduler {
    fn schedule_once(&self, delay: Duration, job: ReminderJob) {
        self.once.lock().unwrap().push((delay, job));
    }

    fn schedule_daily(&self, name: &str, _at: NaiveTime, _job: ReminderJob) -> bool {
        self.daily.lock().unwrap().insert(name.to_owned())
    }

    fn has_job(&self, name: &str) -> bool {
        self.daily.lock().unwrap().contains(name)
    }
}

pub struct Harness {
    pub router: EventRouter,
    pub storage: Arc<Storage>,
    pub completer: Arc<FakeCompleter>,
    pub scheduler: Arc<RecordingScheduler>,
    pub clock: UserClock,
    _dir: TempDir,
}

pub fn harness(completer: FakeCompleter) -> Harness {
    harness_with_transcript(completer, "")
}

pub fn harness_with_transcript(completer: FakeCompleter, transcript: &str) -> Harness {
    let (storage, dir) = create_test_storage();
    let completer = Arc::new(completer);
    let scheduler = Arc::new(RecordingScheduler::default());
    let clock = UserClock::default();
    let router = EventRouter::new(
        Arc::clone(&storage),
        Arc::clone(&completer) as Arc<dyn Completer>,
        Arc::new(FakeTranscriber { transcript: transcript.to_owned() }),
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
        clock,
    );
    Harness { router, storage, completer, scheduler, clock, _dir: dir }
}
