//! Typed error enum for the service layer.
//!
//! Unifies storage, completer, transcriber and parsing failures so the event
//! router can turn each one into the matching user-facing reply.

use planbot_core::CoreError;
use planbot_llm::LlmError;
use planbot_speech::SpeechError;
use planbot_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    #[error("speech: {0}")]
    Speech(#[from] SpeechError),

    #[error("{0}")]
    Core(#[from] CoreError),

    /// Caller provided invalid input (empty text, out-of-range number).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Referenced record does not exist for this owner.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_not_found(),
            Self::NotFound(_) => true,
            _ => false,
        }
    }

    /// Whether a collaborator (completer, transcriber) caused the failure.
    pub const fn is_collaborator(&self) -> bool {
        matches!(self, Self::Llm(_) | Self::Speech(_))
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_storage_and_service_variants() {
        let storage = ServiceError::from(StorageError::NotFound { entity: "task", id: 3 });
        assert!(storage.is_not_found());
        assert!(ServiceError::NotFound("note 4".to_owned()).is_not_found());
        assert!(!ServiceError::InvalidInput("x".to_owned()).is_not_found());
    }

    #[test]
    fn collaborator_errors_are_flagged() {
        assert!(ServiceError::from(LlmError::EmptyResponse).is_collaborator());
        assert!(!ServiceError::from(CoreError::Parse("x".to_owned())).is_collaborator());
    }
}
