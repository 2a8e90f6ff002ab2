use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use planbot_service::ChatEvent;

use crate::AppState;
use crate::api_types::EventResponse;

/// Feeds one chat event to the planner. Failures are answered in the replies.
pub async fn post_event(State(state): State<Arc<AppState>>, Json(event): Json<ChatEvent>) -> Json<EventResponse> {
    let owner = event.user.user_id;
    let replies = state.router.handle(event).await;
    tracing::debug!(%owner, replies = replies.len(), "Event handled");
    Json(EventResponse { replies })
}
