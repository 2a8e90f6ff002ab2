//! Domain types and pure parsers for planbot.
//!
//! Everything here is free of I/O: the store, completer and transports live
//! in the other crates and depend on this one.

pub mod constants;
pub mod dates;
pub mod env_config;
mod error;
pub mod json_utils;
pub mod lexicon;
pub mod model;
pub mod progress;
pub mod slot;

pub use dates::{DueDate, parse_due, parse_time};
pub use error::*;
pub use model::*;
pub use progress::{ProgressChange, progress_dot};
pub use slot::{Slot, extract_slot};
