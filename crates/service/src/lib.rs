//! Service layer for planbot
//!
//! Planner operations, the life-plan dialogue, the AI secretary and the
//! transport-neutral event router that ties them to chat messages.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::ref_patterns, reason = "Ref patterns are clearer in some contexts")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::manual_let_else, reason = "if let is clearer")]
#![allow(clippy::let_underscore_untyped, reason = "Type is clear from context")]
#![allow(clippy::let_underscore_must_use, reason = "Intentionally ignoring results")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Dialogue dispatch is inherently branchy")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

pub mod callback;
mod clock;
mod config;
pub mod dialogue;
mod error;
pub mod message;
mod planner;
mod reminders;
pub mod render;
mod router;
pub mod secretary;
pub mod session;
#[cfg(test)]
mod tests;

pub use callback::Callback;
pub use clock::UserClock;
pub use config::{Settings, default_db_path};
pub use dialogue::{DialogueEngine, LifePlanState};
pub use error::{Result, ServiceError};
pub use message::{Button, Keyboard, Message};
pub use planner::{DueUpdate, PlannerService, ViewKind, parse_progress};
pub use reminders::{ReminderJob, Scheduler, TokioScheduler, delay_until, delay_until_daily, digest_job_name};
pub use router::{ChatEvent, EventKind, EventRouter, Reply, UserRef};
pub use session::{Pending, SessionRegistry};
