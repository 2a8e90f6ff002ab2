use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::api_types::FiredReminder;

/// Returns every reminder fired since the previous call.
pub async fn drain_reminders(State(state): State<Arc<AppState>>) -> Json<Vec<FiredReminder>> {
    Json(state.drain_fired().await)
}
