use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{AudioConverter, DisabledTranscriber, SpeechError, SpeechPipeline, Transcriber, WhisperClient};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn uploads_wav_and_trims_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(header("Authorization", "Bearer stt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "  купить хлеб \n"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let wav = dir.path().join("clip.wav");
    std::fs::write(&wav, b"RIFF....WAVE").unwrap();

    let client = WhisperClient::new(&server.uri(), Some("stt-key".to_owned()), TIMEOUT).unwrap();
    assert_eq!(client.transcribe_wav(&wav).await.unwrap(), "купить хлеб");
}

#[tokio::test]
async fn rejected_upload_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let wav = dir.path().join("clip.wav");
    std::fs::write(&wav, b"RIFF").unwrap();

    let client = WhisperClient::new(&server.uri(), None, TIMEOUT).unwrap();
    let err = client.transcribe_wav(&wav).await.unwrap_err();
    assert!(matches!(err, SpeechError::HttpStatus { code: 401, .. }));
}

#[tokio::test]
async fn pipeline_surfaces_conversion_failure_and_leaves_no_wav() {
    let dir = TempDir::new().unwrap();
    let client = WhisperClient::new("http://127.0.0.1:9", None, TIMEOUT).unwrap();
    let pipeline =
        SpeechPipeline::new(AudioConverter::new("/nonexistent/ffmpeg-planbot"), client).with_work_dir(dir.path());

    let err = pipeline.transcribe(&dir.path().join("voice.ogg")).await.unwrap_err();
    assert!(matches!(err, SpeechError::Io(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn disabled_transcriber_fails_fast() {
    let err = DisabledTranscriber::new("PLANBOT_STT_URL is not set")
        .transcribe(std::path::Path::new("x.ogg"))
        .await
        .unwrap_err();
    assert!(matches!(err, SpeechError::NotConfigured(_)));
}
