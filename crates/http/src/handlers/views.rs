use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use planbot_core::UserId;
use planbot_service::{Message, ViewKind};

use crate::AppState;
use crate::api_error::ApiError;
use crate::blocking::blocking_json;

pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path((user_id, view)): Path<(i64, String)>,
) -> Result<Json<Message>, ApiError> {
    let kind = view.parse::<ViewKind>().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let router = Arc::clone(&state.router);
    blocking_json(move || router.view(UserId(user_id), kind)).await
}
