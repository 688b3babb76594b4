//! Pulling JSON objects out of free-form model output.

use serde_json::{Map, Value};
use tracing::warn;

use super::provider::{CompletionRequest, LlmProvider};
use crate::error::LlmError;

/// Extract a JSON object from LLM output that might contain markdown or extra text.
pub fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in a markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Outermost braces
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

/// Parse model output into a JSON object map.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, LlmError> {
    let candidate = extract_json_object(text);
    match serde_json::from_str::<Value>(&candidate)? {
        Value::Object(map) => Ok(map),
        other => Err(LlmError::InvalidResponse {
            provider: "model".to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

/// Run a deterministic completion and parse the reply as a JSON object.
pub async fn complete_json(
    llm: &dyn LlmProvider,
    prompt: &str,
    max_tokens: u32,
) -> Result<Map<String, Value>, LlmError> {
    let request = CompletionRequest::prompt(prompt, 0.0).with_max_tokens(max_tokens);
    let response = llm.complete(request).await?;
    parse_json_object(&response.content).inspect_err(|e| {
        warn!(error = %e, raw = %response.content, "Model output was not a JSON object");
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
