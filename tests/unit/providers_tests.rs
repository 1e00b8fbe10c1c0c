/*!
 * Tests for provider request building and response handling
 */

use serde_json::json;
use subtrans::errors::ProviderError;
use subtrans::providers::Provider;
use subtrans::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use std::time::Duration;
use subtrans::providers::ollama::{GenerationRequest, MAX_BACKOFF_MS, Ollama};

#[test]
fn test_generation_request_shouldSerializeOnlySetFields() {
    let request = GenerationRequest::new("llama3.2:3b", "Hola mundo")
        .system("Translate")
        .temperature(0.5)
        .num_predict(64);

    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(
        value,
        json!({
            "model": "llama3.2:3b",
            "prompt": "Hola mundo",
            "system": "Translate",
            "options": { "temperature": 0.5, "num_predict": 64 },
            "stream": false
        })
    );
}

#[test]
fn test_parse_generation_response_withSingleObject_shouldParse() {
    let body = r#"{"model":"m","created_at":"now","response":"Hello world","done":true,"eval_count":3}"#;
    let response = Ollama::parse_generation_response(body).unwrap();

    assert_eq!(Ollama::extract_text(&response), "Hello world");
    assert_eq!(response.eval_count, Some(3));
}

#[test]
fn test_parse_generation_response_withJsonLines_shouldConcatenateFragments() {
    let body = "{\"model\":\"m\",\"response\":\"Hello\",\"done\":false}\n{\"model\":\"m\",\"response\":\" world\",\"done\":true,\"eval_count\":2}\n";
    let response = Ollama::parse_generation_response(body).unwrap();

    assert_eq!(response.response, "Hello world");
    assert!(response.done);
    assert_eq!(response.eval_count, Some(2));
}

#[test]
fn test_parse_generation_response_withGarbage_shouldBeParseError() {
    let err = Ollama::parse_generation_response("<html>502</html>").unwrap_err();
    assert!(matches!(err, ProviderError::ParseError(_)));
}

#[test]
fn test_ollama_from_url_shouldTrimTrailingSlash() {
    let client = Ollama::from_url("http://localhost:11434/", 5);
    assert_eq!(client.base_url(), "http://localhost:11434");
}

#[tokio::test]
async fn test_ollama_test_connection_withNothingListening_shouldBeConnectionError() {
    let client = Ollama::from_url("http://127.0.0.1:1", 2).with_retries(0, 1);
    let err = client.test_connection().await.unwrap_err();

    assert!(matches!(err, ProviderError::ConnectionError(_)), "got {:?}", err);
}

#[test]
fn test_ollama_backoff_delay_shouldDoubleAndCap() {
    let client = Ollama::from_url("http://127.0.0.1:1", 2).with_retries(3, 500);

    assert_eq!(client.backoff_delay(1), Duration::from_millis(500));
    assert_eq!(client.backoff_delay(3), Duration::from_millis(2_000));
    assert_eq!(client.backoff_delay(20), Duration::from_millis(MAX_BACKOFF_MS));
    assert_eq!(client.backoff_delay(64), Duration::from_millis(MAX_BACKOFF_MS));
    assert_eq!(client.backoff_delay(u32::MAX), Duration::from_millis(MAX_BACKOFF_MS));
}

#[tokio::test]
async fn test_ollama_generate_withManyRetries_shouldFailWithoutOverflow() {
    let client = Ollama::from_url("http://127.0.0.1:1", 2).with_retries(70, 0);
    let err = client.generate(&GenerationRequest::new("m", "p")).await.unwrap_err();

    assert!(matches!(err, ProviderError::ConnectionError(_)), "got {:?}", err);
}

#[test]
fn test_anthropic_request_shouldSerializeMessages() {
    let request = AnthropicRequest::new("claude-3-haiku-20240307", 1024)
        .system("Translate")
        .add_message("user", "Adiós");

    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["model"], "claude-3-haiku-20240307");
    assert_eq!(value["max_tokens"], 1024);
    assert_eq!(value["system"], "Translate");
    assert_eq!(value["messages"], json!([{ "role": "user", "content": "Adiós" }]));
    assert!(value.get("temperature").is_none());
}

#[test]
fn test_anthropic_extract_text_shouldJoinTextBlocksOnly() {
    let response: AnthropicResponse = serde_json::from_value(json!({
        "content": [
            { "type": "text", "text": "Good" },
            { "type": "tool_use", "id": "x" },
            { "type": "text", "text": "bye" }
        ],
        "usage": { "input_tokens": 10, "output_tokens": 2 }
    }))
    .unwrap();

    assert_eq!(Anthropic::extract_text(&response), "Goodbye");
    assert_eq!(response.usage.output_tokens, 2);
}

#[test]
fn test_anthropic_messages_url_shouldHandleEndpointVariants() {
    let default = Anthropic::new("key", "", "model", 5);
    assert_eq!(default.messages_url(), "https://api.anthropic.com/v1/messages");

    let custom = Anthropic::new("key", "http://proxy.local/", "model", 5);
    assert_eq!(custom.messages_url(), "http://proxy.local/v1/messages");
}

#[test]
fn test_anthropic_debug_shouldNotLeakApiKey() {
    let client = Anthropic::new("sk-secret-key", "", "model", 5);
    assert!(!format!("{:?}", client).contains("sk-secret-key"));
}
