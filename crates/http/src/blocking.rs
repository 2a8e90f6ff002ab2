//! Running store-bound service calls off the async worker threads.

use axum::Json;
use planbot_service::ServiceError;
use serde::Serialize;
use tokio::task::spawn_blocking;

use crate::api_error::ApiError;

/// Runs a blocking service call and wraps its value in `Json`.
///
/// # Example
/// ```ignore
/// let router = Arc::clone(&state.router);
/// blocking_json(move || router.view(owner, kind)).await
/// ```
pub async fn blocking_json<T, F>(f: F) -> Result<Json<T>, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static + Serialize,
{
    spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("Join error: {}", e);
            ApiError::Internal(e.into())
        })?
        .map(Json)
        .map_err(ApiError::from)
}
