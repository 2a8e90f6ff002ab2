//! Typed error enum for the speech crate.

use thiserror::Error;

/// Errors from audio conversion and transcription.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("audio conversion failed (exit {status:?}): {stderr}")]
    Conversion { status: Option<i32>, stderr: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("transcription is not configured: {0}")]
    NotConfigured(String),
}
