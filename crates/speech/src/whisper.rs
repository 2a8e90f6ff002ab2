use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::SpeechError;

/// Default transcription model name.
pub const DEFAULT_STT_MODEL: &str = "whisper-1";

const LANGUAGE: &str = "ru";

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Client for an OpenAI-compatible `/v1/audio/transcriptions` endpoint.
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl std::fmt::Debug for WhisperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .finish()
    }
}

impl WhisperClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: DEFAULT_STT_MODEL.to_owned(),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Upload a WAV file and return the trimmed transcript (possibly empty).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the request fails or the endpoint rejects it.
    pub async fn transcribe_wav(&self, wav: &Path) -> Result<String, SpeechError> {
        let bytes = tokio::fs::read(wav).await?;
        let file = Part::bytes(bytes).file_name("voice.wav").mime_str("audio/wav")?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("language", LANGUAGE)
            .part("file", file);

        let mut request = self.client.post(format!("{}/v1/audio/transcriptions", self.base_url)).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            return Err(SpeechError::HttpStatus { code: status.as_u16(), body });
        }
        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_owned())
    }
}
