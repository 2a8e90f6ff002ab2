//! HTTP bridge for planbot.
//!
//! Chat events come in as JSON, replies go back in the response body. Fired
//! reminders are buffered until a client drains them.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(unused_results, reason = "Some results are intentionally ignored")]
#![allow(missing_copy_implementations, reason = "Types may grow")]
#![allow(clippy::let_underscore_untyped, reason = "Type is clear from context")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(clippy::ref_patterns, reason = "Ref patterns are clearer")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod api_types;
mod blocking;
mod handlers;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use planbot_service::{EventRouter, ReminderJob};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

pub use api_types::{EventResponse, FiredReminder, VersionResponse};

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Planner entry point shared with the reminder pump
    pub router: Arc<EventRouter>,
    /// Reminders fired since the last drain
    fired: Mutex<Vec<FiredReminder>>,
}

impl AppState {
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self { router, fired: Mutex::new(Vec::new()) }
    }

    pub async fn record_fired(&self, reminder: FiredReminder) {
        self.fired.lock().await.push(reminder);
    }

    pub async fn drain_fired(&self) -> Vec<FiredReminder> {
        std::mem::take(&mut *self.fired.lock().await)
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/events", post(handlers::events::post_event))
        .route("/api/users/{user_id}/views/{view}", get(handlers::views::get_view))
        .route("/api/reminders", get(handlers::reminders::drain_reminders))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Spawns the task that turns fired reminder jobs into buffered messages.
///
/// Ends when every scheduler sender is gone.
pub fn start_reminder_pump(state: Arc<AppState>, mut jobs: mpsc::UnboundedReceiver<ReminderJob>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = jobs.recv().await {
            let Some((chat_id, message)) = state.router.fire(&job) else {
                tracing::debug!(?job, "Reminder fired with nothing to say");
                continue;
            };
            tracing::info!(chat_id, text = %message.text, "Reminder fired");
            state.record_fired(FiredReminder { chat_id, job, message }).await;
        }
        tracing::info!("Reminder pump stopped");
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
