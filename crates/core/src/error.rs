use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by the pure domain layer (parsing and validation).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = StdResult<T, CoreError>;
