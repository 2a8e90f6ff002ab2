use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use planbot_core::UserId;
use planbot_llm::DisabledCompleter;
use planbot_service::{EventRouter, ReminderJob, TokioScheduler, UserClock};
use planbot_speech::DisabledTranscriber;
use planbot_storage::Storage;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use crate::{AppState, create_router, start_reminder_pump};

struct TestApp {
    app: Router,
    state: Arc<AppState>,
    jobs: Option<mpsc::UnboundedReceiver<ReminderJob>>,
    _dir: TempDir,
}

#[expect(clippy::unwrap_used, reason = "test code")]
fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(Storage::open_with_pool_size(&dir.path().join("test.db"), 2).unwrap());
    let clock = UserClock::default();
    let (scheduler, jobs) = TokioScheduler::new(clock);
    let router = EventRouter::new(
        storage,
        Arc::new(DisabledCompleter::new("test")),
        Arc::new(DisabledTranscriber::new("test")),
        Arc::new(scheduler),
        clock,
    );
    let state = Arc::new(AppState::new(Arc::new(router)));
    TestApp { app: create_router(Arc::clone(&state)), state, jobs: Some(jobs), _dir: dir }
}

#[expect(clippy::unwrap_used, reason = "test code")]
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

#[expect(clippy::unwrap_used, reason = "test code")]
fn post_event(event: &Value) -> Request<Body> {
    Request::post("/api/events")
        .header("content-type", "application/json")
        .body(Body::from(event.to_string()))
        .unwrap()
}

#[expect(clippy::unwrap_used, reason = "test code")]
fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn text_event(text: &str) -> Value {
    json!({"user": {"user_id": 3, "chat_id": 3}, "kind": {"type": "text", "data": text}})
}

#[tokio::test]
async fn health_and_version() {
    let t = test_app();
    let (status, body) = send(&t.app, get("/health")).await;
    assert_eq!((status, body), (StatusCode::OK, Value::String("ok".to_owned())));

    let (status, body) = send(&t.app, get("/api/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn text_event_is_saved_and_visible_in_inbox_view() {
    let t = test_app();
    let (status, body) = send(&t.app, post_event(&text_event("Позвонить юристу"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replies"][0]["mode"], "send");
    assert_eq!(body["replies"][0]["message"]["text"], "Сохранено в инбокс");

    let (status, view) = send(&t.app, get("/api/users/3/views/inbox")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["text"].as_str().unwrap().contains("Позвонить юристу"));
    assert_eq!(view["keyboard"]["type"], "inline");
}

#[tokio::test]
async fn button_event_replies_with_edit() {
    let t = test_app();
    let event = json!({
        "user": {"user_id": 3, "chat_id": 3},
        "kind": {"type": "button", "data": {"payload": "today_add"}}
    });
    let (_, body) = send(&t.app, post_event(&event)).await;
    assert_eq!(body["replies"][0]["mode"], "edit");
    assert_eq!(body["replies"][0]["message"]["text"], "Введи текст задачи:");
}

#[tokio::test]
async fn unknown_view_is_bad_request() {
    let t = test_app();
    let (status, body) = send(&t.app, get("/api/users/3/views/yesterday")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown view"));
}

#[tokio::test]
async fn malformed_event_is_rejected() {
    let t = test_app();
    let request = Request::post("/api/events")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"user": 1}"#))
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn fired_reminders_are_drained_once() {
    let mut t = test_app();
    let router = Arc::clone(&t.state.router);
    router.planner().add_note(UserId(3), "мысль").unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    drop(t.jobs.take());
    let pump = start_reminder_pump(Arc::clone(&t.state), rx);
    tx.send(ReminderJob::InboxDigest { owner: UserId(3), chat_id: 3 }).unwrap();
    tx.send(ReminderJob::InboxDigest { owner: UserId(4), chat_id: 4 }).unwrap();
    drop(tx);
    tokio::time::timeout(Duration::from_secs(5), pump).await.unwrap().unwrap();

    let (status, body) = send(&t.app, get("/api/reminders")).await;
    assert_eq!(status, StatusCode::OK);
    let fired = body.as_array().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0]["chat_id"], 3);
    assert_eq!(fired[0]["job"]["kind"], "inbox_digest");

    let (_, body) = send(&t.app, get("/api/reminders")).await;
    assert_eq!(body, json!([]));
}
