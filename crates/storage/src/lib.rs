//! Storage layer for planbot
//!
//! SQLite-backed, owner-scoped record store with versioned schema creation.

mod error;
mod migrations;
mod storage;
#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use migrations::SCHEMA_VERSION;
pub use storage::{Export, Storage};
