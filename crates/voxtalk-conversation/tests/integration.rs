use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use voxtalk_core::config::ChatConfig;
use voxtalk_core::{Author, TransportError};
use voxtalk_conversation::{
    ChatRequest, ChatTransport, ConversationPipeline, HttpChatTransport, PipelineSettings,
};
use voxtalk_synthesis::{SynthesisCommand, SynthesisHandle};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> HttpChatTransport {
    let config = ChatConfig {
        endpoint: format!("{}/api/chat", server.uri()),
        timeout_secs: 5,
        ..ChatConfig::default()
    };
    HttpChatTransport::new(&config).unwrap()
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        model: None,
        context: None,
    }
}

#[tokio::test]
async fn test_http_transport_posts_message_and_reads_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "Hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Hi there" })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport_for(&server).send(&request("Hello")).await.unwrap();
    assert_eq!(reply.message, "Hi there");
}

#[tokio::test]
async fn test_http_transport_reports_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    match transport_for(&server).send(&request("Hello")).await {
        Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_transport_rejects_malformed_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "wrong field" })))
        .mount(&server)
        .await;

    assert!(matches!(
        transport_for(&server).send(&request("Hello")).await,
        Err(TransportError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_pipeline_over_http_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "Hello", "model": "small" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Hi there" })))
        .mount(&server)
        .await;

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
    let settings = PipelineSettings {
        model: Some("small".to_string()),
        ..PipelineSettings::default()
    };
    let mut pipeline = ConversationPipeline::new(
        Arc::new(transport_for(&server)),
        Some(SynthesisHandle::from_sender(cmd_tx)),
        settings,
    );

    pipeline.on_transcript("Hello").await;

    let messages = pipeline.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[0].sequence, messages[0].author), (1, Author::User));
    assert_eq!(messages[0].text, "Hello");
    assert_eq!((messages[1].sequence, messages[1].author), (2, Author::Assistant));
    assert_eq!(messages[1].text, "Hi there");
    assert_eq!(
        cmd_rx.try_recv(),
        Ok(SynthesisCommand::Speak("Hi there".to_string()))
    );
}

#[tokio::test]
async fn test_pipeline_over_http_server_error_keeps_user_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let settings = PipelineSettings::default();
    let apology = settings.error_message.clone();
    let mut pipeline =
        ConversationPipeline::new(Arc::new(transport_for(&server)), None, settings);

    pipeline.on_transcript("Hello").await;

    let texts: Vec<&str> = pipeline.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello", apology.as_str()]);
    let error = pipeline.state().last_error.as_deref().unwrap();
    assert!(error.contains("500"), "unexpected error: {error}");
}
