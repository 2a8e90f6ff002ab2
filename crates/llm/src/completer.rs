use async_trait::async_trait;
use planbot_core::json_utils::strip_markdown_json;
use serde_json::Value;

use crate::client::LlmClient;
use crate::error::LlmError;

/// Reply of the completion endpoint: JSON when it parses as an object or array, text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Structured(Value),
    Text(String),
}

impl Completion {
    /// Classify raw reply content. Markdown fences around JSON are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();
        match serde_json::from_str::<Value>(strip_markdown_json(trimmed)) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Self::Structured(value),
            _ => Self::Text(trimmed.to_owned()),
        }
    }

    /// Text shown to the user: the reply itself, or pretty-printed JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        }
    }
}

/// Anything that can answer a planning prompt.
#[async_trait]
pub trait Completer: Send + Sync {
    /// # Errors
    /// Returns an error when the backend is unreachable, rejects the request or replies garbage.
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError>;
}

#[async_trait]
impl Completer for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Requesting completion");
        let content = self.chat_completion(prompt).await?;
        Ok(Completion::parse(&content))
    }
}

/// Stand-in used when no API key is configured; every call fails with `NotConfigured`.
#[derive(Debug, Clone)]
pub struct DisabledCompleter {
    reason: String,
}

impl DisabledCompleter {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl Completer for DisabledCompleter {
    async fn complete(&self, _prompt: &str) -> Result<Completion, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }
}
