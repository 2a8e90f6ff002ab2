//! Text-completion client for planbot.
//!
//! [`LlmClient`] talks to an OpenAI-compatible `/v1/chat/completions`
//! endpoint; the [`Completer`] trait is the seam the service layer depends on.

mod ai_types;
mod client;
mod completer;
mod error;
pub mod prompts;
#[cfg(test)]
mod tests;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, LlmClient};
pub use completer::{Completer, Completion, DisabledCompleter};
pub use error::LlmError;
