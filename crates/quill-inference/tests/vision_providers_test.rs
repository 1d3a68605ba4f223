//! HTTP-level tests for the OpenAI and Anthropic vision backends.
//!
//! Each test stands up a wiremock server in place of the provider API and
//! checks the request path, headers and body shape, then the response
//! handling.

use quill_core::{Error, ImagePayload, LlmProvider, ProviderSettings, QuillConfig};
use quill_inference::{
    build_backend, recognize_vision, AnthropicVisionBackend, OpenAIVisionBackend, VisionBackend,
    VisionOptions,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn settings(server: &MockServer, model: &str) -> ProviderSettings {
    ProviderSettings {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        model: model.to_string(),
    }
}

fn image() -> ImagePayload {
    ImagePayload::from_bytes(PNG_HEADER).unwrap()
}

// =============================================================================
// OPENAI
// =============================================================================

#[tokio::test]
async fn test_openai_sends_image_and_prompt() {
    let mock_server = MockServer::start().await;
    let image = image();

    let chat_response = json!({
        "id": "chatcmpl-123",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "TEXT:\nHello world\n\nTAGS:\ngreeting, demo\n\nSUMMARY:\nA greeting."
            },
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 1000,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text"},
                    {"type": "image_url", "image_url": {"url": image.to_data_url()}}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&chat_response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIVisionBackend::new(&settings(&mock_server, "gpt-4o")).unwrap();
    let options = VisionOptions {
        suggest_tags: true,
        summarize: true,
        max_tokens: 1000,
    };

    let result = recognize_vision(&backend, &image, &options).await.unwrap();
    assert_eq!(result.text, "Hello world");
    assert_eq!(result.tags.into_vec(), vec!["greeting", "demo"]);
    assert_eq!(result.summary.as_deref(), Some("A greeting."));
    assert_eq!(result.confidence, 0.9);
}

#[tokio::test]
async fn test_openai_error_status_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Invalid API key",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIVisionBackend::new(&settings(&mock_server, "gpt-4o")).unwrap();
    let err = backend.complete("title please", 20).await.unwrap_err();

    match err {
        Error::Provider { status, message } => {
            assert_eq!(status, Some(401));
            assert!(message.contains("Invalid API key"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_empty_choices_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let backend = OpenAIVisionBackend::new(&settings(&mock_server, "gpt-4o")).unwrap();
    let err = backend.complete("hi", 20).await.unwrap_err();
    assert!(matches!(err, Error::Provider { status: None, .. }));
}

// =============================================================================
// ANTHROPIC
// =============================================================================

#[tokio::test]
async fn test_anthropic_sends_base64_image_block() {
    let mock_server = MockServer::start().await;
    let image = image();

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "max_tokens": 256,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text"},
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": "image/png",
                            "data": image.base64.clone()
                        }
                    }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "TEXT:\nMeeting at noon"}],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = AnthropicVisionBackend::new(&settings(&mock_server, "claude-test")).unwrap();
    let options = VisionOptions {
        suggest_tags: false,
        summarize: false,
        max_tokens: 256,
    };

    let result = recognize_vision(&backend, &image, &options).await.unwrap();
    assert_eq!(result.text, "Meeting at noon");
    assert!(result.tags.is_empty());
    assert!(result.summary.is_none());
}

#[tokio::test]
async fn test_anthropic_error_status_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = AnthropicVisionBackend::new(&settings(&mock_server, "claude-test")).unwrap();
    let err = backend.complete("hi", 20).await.unwrap_err();

    assert!(matches!(err, Error::Provider { status: Some(529), .. }));
    assert!(err.to_string().contains("Overloaded"));
}

#[tokio::test]
async fn test_build_backend_routes_to_configured_provider() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Weekly Planning Notes"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = QuillConfig {
        llm_provider: LlmProvider::Anthropic,
        anthropic: settings(&mock_server, "claude-test"),
        ..Default::default()
    };

    let backend = build_backend(&config).unwrap().expect("provider configured");
    assert_eq!(backend.provider(), LlmProvider::Anthropic);
    let title = backend.complete("title", 20).await.unwrap();
    assert_eq!(title, "Weekly Planning Notes");
}
