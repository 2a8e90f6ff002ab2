//! Runtime settings gathered from the environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use planbot_core::constants::DEFAULT_UTC_OFFSET_MINUTES;
use planbot_core::env_config::{env_first, env_parse_with_default};
use planbot_llm::{Completer, DEFAULT_BASE_URL, DEFAULT_MODEL, DisabledCompleter, LlmClient};
use planbot_speech::{
    AudioConverter, DEFAULT_STT_MODEL, DisabledTranscriber, SpeechPipeline, Transcriber, WhisperClient,
};

use crate::clock::UserClock;
use crate::error::Result;

const DEFAULT_POOL_SIZE: u32 = 4;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub db_pool_size: u32,
    pub llm_api_key: Option<String>,
    pub llm_url: String,
    pub llm_model: String,
    pub stt_url: Option<String>,
    pub stt_api_key: Option<String>,
    pub stt_model: String,
    pub ffmpeg: PathBuf,
    pub utc_offset_minutes: i32,
    pub http_timeout: Duration,
}

impl Settings {
    /// Read every `PLANBOT_*` variable, falling back to defaults.
    ///
    /// Unparsable numbers are logged and replaced by their default; missing
    /// keys only disable the feature that needs them.
    pub fn from_env() -> Self {
        Self {
            db_path: env_first(&["PLANBOT_DB_PATH"]).map_or_else(default_db_path, PathBuf::from),
            db_pool_size: env_parse_with_default("PLANBOT_DB_POOL_SIZE", DEFAULT_POOL_SIZE),
            llm_api_key: env_first(&["PLANBOT_LLM_API_KEY", "DEEPSEEK_API_KEY"]),
            llm_url: env_first(&["PLANBOT_LLM_URL"]).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            llm_model: env_first(&["PLANBOT_LLM_MODEL"]).unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            stt_url: env_first(&["PLANBOT_STT_URL"]),
            stt_api_key: env_first(&["PLANBOT_STT_API_KEY"]),
            stt_model: env_first(&["PLANBOT_STT_MODEL"]).unwrap_or_else(|| DEFAULT_STT_MODEL.to_owned()),
            ffmpeg: env_first(&["PLANBOT_FFMPEG"]).map_or_else(|| PathBuf::from("ffmpeg"), PathBuf::from),
            utc_offset_minutes: env_parse_with_default(
                "PLANBOT_UTC_OFFSET_MINUTES",
                DEFAULT_UTC_OFFSET_MINUTES,
            ),
            http_timeout: Duration::from_secs(env_parse_with_default(
                "PLANBOT_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        }
    }

    pub fn clock(&self) -> UserClock {
        UserClock::from_offset_minutes(self.utc_offset_minutes)
    }

    /// HTTP completer when a key is configured, otherwise a stand-in that
    /// answers every call with a "not configured" error.
    pub fn build_completer(&self) -> Result<Arc<dyn Completer>> {
        let Some(key) = self.llm_api_key.clone() else {
            tracing::warn!("No LLM API key configured, AI features disabled");
            return Ok(Arc::new(DisabledCompleter::new("set PLANBOT_LLM_API_KEY or DEEPSEEK_API_KEY")));
        };
        let client =
            LlmClient::new(key, &self.llm_url, self.http_timeout)?.with_model(self.llm_model.clone());
        tracing::info!(base_url = %client.base_url(), model = %client.model(), "LLM completer ready");
        Ok(Arc::new(client))
    }

    pub fn build_transcriber(&self) -> Result<Arc<dyn Transcriber>> {
        let Some(url) = self.stt_url.as_deref() else {
            tracing::warn!("No transcription endpoint configured, voice input disabled");
            return Ok(Arc::new(DisabledTranscriber::new("set PLANBOT_STT_URL")));
        };
        let client = WhisperClient::new(url, self.stt_api_key.clone(), self.http_timeout)?
            .with_model(self.stt_model.clone());
        let pipeline = SpeechPipeline::new(AudioConverter::new(self.ffmpeg.clone()), client);
        tracing::info!(url, ffmpeg = %self.ffmpeg.display(), "Speech pipeline ready");
        Ok(Arc::new(pipeline))
    }
}

/// `<data_local_dir>/planbot/planbot.db`, or `./planbot.db` without a home.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from("planbot.db"),
        |dir| dir.join("planbot").join("planbot.db"),
    )
}
