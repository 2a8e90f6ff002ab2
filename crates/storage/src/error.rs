//! Typed error enum for the storage layer.
//!
//! Callers match on specific failure modes (missing row, corrupt row,
//! pool exhaustion) instead of downcasting opaque boxes.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Owner-scoped lookup found no row.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// SQL failure.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// No connection available from the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Row data could not be decoded into its record type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Column decode failures become `DataCorruption`; everything else stays `Database`.
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
                Self::DataCorruption { context: format!("column {idx} failed to decode"), source }
            },
            rusqlite::Error::InvalidColumnType(idx, name, ty) => Self::DataCorruption {
                context: format!("column {idx} ({name}) has unexpected type {ty}"),
                source: "invalid column type".into(),
            },
            other => Self::Database(other),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
