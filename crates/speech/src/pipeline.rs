use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::converter::AudioConverter;
use crate::error::SpeechError;
use crate::whisper::WhisperClient;

/// Turns a recorded voice clip into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// # Errors
    /// Returns an error when conversion or recognition fails.
    async fn transcribe(&self, clip: &Path) -> Result<String, SpeechError>;
}

/// ffmpeg conversion followed by remote recognition; the intermediate WAV is always removed.
#[derive(Debug)]
pub struct SpeechPipeline {
    converter: AudioConverter,
    client: WhisperClient,
    work_dir: PathBuf,
}

impl SpeechPipeline {
    #[must_use]
    pub fn new(converter: AudioConverter, client: WhisperClient) -> Self {
        Self { converter, client, work_dir: std::env::temp_dir() }
    }

    /// Directory for intermediate WAV files (default: the system temp dir).
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }
}

#[async_trait]
impl Transcriber for SpeechPipeline {
    async fn transcribe(&self, clip: &Path) -> Result<String, SpeechError> {
        let wav = self.work_dir.join(format!("planbot-voice-{}.wav", uuid::Uuid::new_v4()));
        let result = async {
            self.converter.convert(clip, &wav).await?;
            self.client.transcribe_wav(&wav).await
        }
        .await;
        if let Err(e) = tokio::fs::remove_file(&wav).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %wav.display(), error = %e, "Failed to remove temporary WAV");
            }
        }
        let text = result?;
        tracing::info!(chars = text.chars().count(), "Voice clip transcribed");
        Ok(text)
    }
}

/// Stand-in used when no transcription endpoint is configured.
#[derive(Debug, Clone)]
pub struct DisabledTranscriber {
    reason: String,
}

impl DisabledTranscriber {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl Transcriber for DisabledTranscriber {
    async fn transcribe(&self, _clip: &Path) -> Result<String, SpeechError> {
        Err(SpeechError::NotConfigured(self.reason.clone()))
    }
}
