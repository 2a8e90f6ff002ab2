//! Voice-to-text intake for planbot.

mod converter;
mod error;
mod pipeline;
#[cfg(test)]
mod tests;
mod whisper;

pub use converter::AudioConverter;
pub use error::SpeechError;
pub use pipeline::{DisabledTranscriber, SpeechPipeline, Transcriber};
pub use whisper::{DEFAULT_STT_MODEL, WhisperClient};
