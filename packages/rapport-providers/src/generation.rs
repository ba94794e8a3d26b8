//! Chat-completions client used to draft and repair match narratives.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use rapport_config::LlmProviderConfig;

/// Sends one chat-completions request and returns the text of the first choice.
pub async fn complete(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let Some(api_key) = cfg.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
		return Err(Error::InvalidConfig {
			message: "Narrative provider has no API key configured.".to_string(),
		});
	};
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
	});

	tracing::debug!(provider_id = %cfg.provider_id, model = %cfg.model, "Requesting narrative completion.");

	let res = client
		.post(&url)
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_content(&json)
}

fn parse_completion_content(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.content.".to_string(),
		})?;

	if content.trim().is_empty() {
		return Err(Error::InvalidResponse {
			message: "Completion content is empty.".to_string(),
		});
	}

	Ok(content.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"summary\": \"x\"}" } },
				{ "message": { "content": "ignored" } }
			]
		});
		let content = parse_completion_content(&json).expect("parse failed");

		assert_eq!(content, "{\"summary\": \"x\"}");
	}

	#[test]
	fn rejects_missing_or_blank_content() {
		let missing = serde_json::json!({ "choices": [] });
		let blank = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });

		assert!(matches!(parse_completion_content(&missing), Err(Error::InvalidResponse { .. })));
		assert!(matches!(parse_completion_content(&blank), Err(Error::InvalidResponse { .. })));
	}
}
