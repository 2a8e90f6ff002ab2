use std::sync::Arc;

use anyhow::Result;
use planbot_http::{AppState, create_router, start_reminder_pump};
use planbot_service::Settings;

use crate::build_router;

pub(crate) async fn run(settings: &Settings, port: u16, host: String) -> Result<()> {
    let (router, jobs) = build_router(settings)?;
    if let Err(e) = router.restore_reminders() {
        tracing::warn!("Reminder restore failed: {}", e);
    }

    let state = Arc::new(AppState::new(router));
    start_reminder_pump(Arc::clone(&state), jobs);

    let app = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
