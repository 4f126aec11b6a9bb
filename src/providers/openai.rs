use crate::{
    config::LlmConfig,
    error::AppError,
    models::openai::{ChatCompletionRequest, ChatCompletionResponse},
};
use reqwest::Client;
use std::time::Duration;

/// Call OpenAI Chat Completions API
pub async fn chat_completions(
    client: &Client,
    config: &LlmConfig,
    request: &ChatCompletionRequest,
) -> Result<ChatCompletionResponse, AppError> {
    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(config.timeout_seconds))
        .json(request)
        .send()
        .await?;

    // Check for HTTP errors
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::UpstreamError {
            status,
            message: error_text,
        });
    }

    let status = response.status();
    let body = response.text().await?;
    // Keep the real status so an unparseable 200 is not retried as a 5xx
    serde_json::from_str(&body).map_err(|e| AppError::UpstreamError {
        status,
        message: format!("Unreadable chat completion response: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::openai::ChatMessage;
    use httpmock::prelude::*;
    use serde_json::json;

    fn create_test_config(base_url: String) -> LlmConfig {
        LlmConfig {
            api_key: "sk-test-key".to_string(),
            base_url,
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    fn create_test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![ChatMessage::user("Replace two doors")],
            max_tokens: Some(10),
            temperature: Some(0.7),
        }
    }

    #[tokio::test]
    async fn test_chat_completions_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer sk-test-key");
                then.status(200).json_body(json!({
                    "id": "chatcmpl-1",
                    "model": "gpt-4",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "{}"},
                        "finish_reason": "stop"
                    }]
                }));
            })
            .await;

        let config = create_test_config(server.url("/v1"));
        let response = chat_completions(&Client::new(), &config, &create_test_request())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.first_content(), Some("{}"));
    }

    #[tokio::test]
    async fn test_chat_completions_upstream_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let config = create_test_config(server.base_url());
        let err = chat_completions(&Client::new(), &config, &create_test_request())
            .await
            .unwrap_err();

        match err {
            AppError::UpstreamError { status, message } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_chat_completions_unreadable_body_is_not_transient() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).body("<html>gateway page</html>");
            })
            .await;

        let config = create_test_config(server.base_url());
        let err = chat_completions(&Client::new(), &config, &create_test_request())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(&err, AppError::UpstreamError { status, .. } if status.as_u16() == 200));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
        assert!(!crate::retry::is_transient(&err));
    }
}
