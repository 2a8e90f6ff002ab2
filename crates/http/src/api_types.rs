use planbot_service::{Message, ReminderJob, Reply};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub replies: Vec<Reply>,
}

/// A reminder message waiting to be delivered to `chat_id`.
#[derive(Debug, Clone, Serialize)]
pub struct FiredReminder {
    pub chat_id: i64,
    pub job: ReminderJob,
    pub message: Message,
}
