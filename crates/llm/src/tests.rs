use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{Completer, Completion, DEFAULT_TIMEOUT, DisabledCompleter, LlmClient, LlmError};

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {
                "content": content,
                "role": "assistant"
            }
        }]
    }))
}

async fn client_for(server: &MockServer) -> LlmClient {
    LlmClient::new("test-key".to_owned(), &server.uri(), DEFAULT_TIMEOUT).unwrap()
}

#[tokio::test]
async fn sends_system_prompt_and_sampling_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "temperature": 0.3,
            "max_tokens": 512,
            "messages": [
                {"role": "system", "content": crate::prompts::SYSTEM_PROMPT},
                {"role": "user", "content": "когда бегать?"}
            ]
        })))
        .respond_with(reply("  • завтра 08:00–09:00 пробежка  "))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let completion = client.complete("когда бегать?").await.unwrap();
    assert_eq!(completion, Completion::Text("• завтра 08:00–09:00 пробежка".to_owned()));
}

#[tokio::test]
async fn fenced_json_becomes_structured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(reply("```json\n{\"action\": \"create_tasks\", \"tasks\": []}\n```"))
        .mount(&server)
        .await;

    let completion = client_for(&server).await.complete("plan").await.unwrap();
    assert_eq!(completion, Completion::Structured(json!({"action": "create_tasks", "tasks": []})));
}

#[tokio::test]
async fn error_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).await.complete("x").await.unwrap_err();
    match err {
        LlmError::HttpStatus { code, ref body } => {
            assert_eq!(code, 503);
            assert_eq!(body, "overloaded");
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_choices_and_garbage_bodies_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(client.complete("x").await, Err(LlmError::EmptyResponse)));
    assert!(matches!(client.complete("x").await, Err(LlmError::JsonParse { .. })));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/v1/chat/completions")).respond_with(reply("ok")).mount(&server).await;

    let client = LlmClient::new("k".to_owned(), &format!("{}/", server.uri()), DEFAULT_TIMEOUT)
        .unwrap()
        .with_model("custom".to_owned());
    assert_eq!(client.model(), "custom");
    assert_eq!(client.complete("x").await.unwrap(), Completion::Text("ok".to_owned()));
}

#[tokio::test]
async fn disabled_completer_reports_reason() {
    let err = DisabledCompleter::new("PLANBOT_LLM_API_KEY is not set").complete("x").await.unwrap_err();
    assert!(err.to_string().contains("PLANBOT_LLM_API_KEY"));
    assert!(matches!(err, LlmError::NotConfigured(_)));
}

#[test]
fn completion_classification() {
    assert_eq!(Completion::parse("42"), Completion::Text("42".to_owned()));
    assert_eq!(Completion::parse(" [\"a\", \"b\"] "), Completion::Structured(json!(["a", "b"])));
    assert_eq!(Completion::parse("just text"), Completion::Text("just text".to_owned()));
    assert_eq!(Completion::Structured(json!({"a": 1})).render(), "{\n  \"a\": 1\n}");
}

#[test]
fn debug_hides_api_key() {
    let client = LlmClient::new("secret".to_owned(), "http://localhost", DEFAULT_TIMEOUT).unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("secret"));
    assert!(debug.contains("***"));
}
