//! Turns a free-text job description into a validated change order using an
//! OpenAI-compatible chat completion endpoint.

use reqwest::Client;
use serde_json::Value;
use std::time::Instant;

use crate::config::LlmConfig;
use crate::error::AppError;
use crate::models::openai::{ChatCompletionRequest, ChatMessage};
use crate::models::ChangeOrderInput;
use crate::providers::openai;
use crate::retry::{with_retry, RetryPolicy};

/// Keys the model must always return, even when a section is empty
pub const REQUIRED_KEYS: [&str; 5] = [
    "title",
    "materials",
    "equipment",
    "labor",
    "general_requirements",
];

pub const SYSTEM_PROMPT: &str = r#"You are a construction cost estimator. Create a detailed change order from the job description.
Your task is to analyze the job description and create a structured breakdown of costs.

You must return a valid JSON object with this exact structure:
{
    "title": "string",
    "materials": [{"description": "string", "qty": number, "unit": "string", "unit_price": number}],
    "equipment": [{"description": "string", "qty": number, "unit": "string", "duration": number, "duration_unit": "string", "unit_price": number}],
    "labor": [{"description": "string", "trade": "string", "workers": number, "hours_per_day": number, "days": number, "hourly_rate": number}],
    "general_requirements": [{"description": "string", "qty": number, "unit": "string", "unit_price": number}],
    "subcontractors": [{"description": "string", "qty": number, "unit": "string", "price": number}]
}

Important:
1. Return ONLY the JSON object, no other text
2. All numeric values must be numbers, not strings
3. Include realistic quantities and prices
4. Ensure all required fields are present
5. "workers" must be a whole number
6. Include "subcontractors" only for work performed by a subcontractor; omit it or use an empty array otherwise"#;

/// A change order parsed from model output
#[derive(Debug, Clone)]
pub struct ParsedChangeOrder {
    pub input: ChangeOrderInput,
    /// The JSON object exactly as the model returned it
    pub raw: Value,
}

/// Ask the model to break `description` down into line items.
///
/// Transient provider failures are retried per `llm.max_retries`; malformed
/// output is not.
pub async fn parse_job_description(
    client: &Client,
    config: &LlmConfig,
    description: &str,
) -> Result<ParsedChangeOrder, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Job description cannot be empty".to_string(),
        ));
    }

    let request = build_request(config, description);
    tracing::info!(
        model = %config.model,
        description_len = description.len(),
        "Sending job description to LLM"
    );

    let start = Instant::now();
    let result = with_retry(RetryPolicy::from_config(config), || {
        openai::chat_completions(client, config, &request)
    })
    .await;
    let outcome = if result.is_ok() { "success" } else { "error" };
    crate::metrics::record_llm_duration(&config.model, outcome, start.elapsed());

    let response = result?;
    if let Some(usage) = &response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "LLM usage"
        );
    }

    let content = response
        .first_content()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::LlmResponse("Empty content in LLM response".to_string()))?;

    parse_model_output(content)
}

fn build_request(config: &LlmConfig, description: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(description),
        ],
        max_tokens: Some(config.max_tokens),
        temperature: Some(config.temperature),
    }
}

/// Validate raw model text and convert it into a change order
pub fn parse_model_output(content: &str) -> Result<ParsedChangeOrder, AppError> {
    let cleaned = strip_code_fences(content);
    let raw: Value = serde_json::from_str(cleaned).map_err(|e| {
        tracing::debug!(content = %cleaned, "Unparseable LLM output");
        AppError::LlmResponse(format!("Failed to parse JSON response: {}", e))
    })?;

    let missing = missing_required_keys(&raw);
    if !missing.is_empty() {
        return Err(AppError::LlmResponse(format!(
            "Missing required fields in response: {}",
            missing.join(", ")
        )));
    }

    let input = ChangeOrderInput::from_value(&raw)?;
    if input.has_negative_values() {
        tracing::warn!(title = %input.display_title(), "Change order contains negative amounts");
    }

    tracing::info!(
        title = %input.display_title(),
        items = input.item_count(),
        "Parsed change order"
    );
    Ok(ParsedChangeOrder { input, raw })
}

/// Remove a surrounding ```json / ``` fence if present
pub fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Required keys absent from `value`, in declaration order
pub fn missing_required_keys(value: &Value) -> Vec<&'static str> {
    match value.as_object() {
        Some(object) => REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect(),
        None => REQUIRED_KEYS.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const VALID_OUTPUT: &str = r#"{
        "title": "Door replacement",
        "materials": [{"description": "Solid core door", "qty": 2, "unit": "ea", "unit_price": 100}],
        "equipment": [],
        "labor": [{"description": "Install doors", "trade": "Carpenter", "workers": 1, "hours_per_day": 8, "days": 1, "hourly_rate": 60}],
        "general_requirements": []
    }"#;

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200}
        })
    }

    fn test_config(base_url: String) -> LlmConfig {
        LlmConfig {
            api_key: "sk-test".to_string(),
            base_url,
            timeout_seconds: 5,
            max_retries: 1,
            retry_base_delay_ms: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_missing_required_keys() {
        let value = json!({"title": "x", "materials": [], "labor": []});
        assert_eq!(
            missing_required_keys(&value),
            vec!["equipment", "general_requirements"]
        );
        assert_eq!(missing_required_keys(&json!([])).len(), 5);
    }

    #[test]
    fn test_parse_model_output() {
        let parsed = parse_model_output(&format!("```json\n{}\n```", VALID_OUTPUT)).unwrap();
        assert_eq!(parsed.input.title, "Door replacement");
        assert_eq!(parsed.input.materials.len(), 1);
        assert_eq!(parsed.input.labor[0].workers, 1);
        assert!(!parsed.input.has_subcontractors());
        assert_eq!(parsed.raw["title"], "Door replacement");
    }

    #[test]
    fn test_parse_model_output_rejects_prose() {
        let err = parse_model_output("Sure! Here is your change order.").unwrap_err();
        assert!(matches!(err, AppError::LlmResponse(_)));
    }

    #[test]
    fn test_parse_model_output_reports_missing_keys() {
        let err = parse_model_output(r#"{"title": "x"}"#).unwrap_err();
        assert!(err
            .to_string()
            .contains("materials, equipment, labor, general_requirements"));
    }

    #[test]
    fn test_parse_model_output_rejects_bad_numbers() {
        let output = r#"{"title": "x", "materials": [{"description": "d", "qty": "two", "unit": "ea", "unit_price": 1}],
            "equipment": [], "labor": [], "general_requirements": []}"#;
        let err = parse_model_output(output).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected_without_calling_llm() {
        let config = test_config("http://127.0.0.1:9".to_string());
        let err = parse_job_description(&Client::new(), &config, "   \n")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_parse_job_description_end_to_end() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(completion(VALID_OUTPUT));
            })
            .await;

        let config = test_config(server.base_url());
        let parsed = parse_job_description(&Client::new(), &config, "Replace two interior doors")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(parsed.input.materials[0].line_total(), 200.0);
        assert_eq!(parsed.input.labor[0].line_total(), 480.0);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(503).body("overloaded");
            })
            .await;

        let config = test_config(server.base_url());
        let err = parse_job_description(&Client::new(), &config, "Paint the lobby")
            .await
            .unwrap_err();

        // first attempt plus one retry
        mock.assert_calls_async(2).await;
        assert!(matches!(err, AppError::UpstreamError { .. }));
    }
}
