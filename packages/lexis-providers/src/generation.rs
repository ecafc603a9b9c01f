use lexis_config::LlmProviderConfig;
use serde_json::Value;

use crate::{Result, error::invalid_response};

/// Sends one non-streaming chat request and returns the generated text. Nothing is retried.
pub async fn generate(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = crate::client(cfg.timeout_ms)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"messages": messages,
		"temperature": cfg.temperature,
		"stream": false,
		"options": { "temperature": cfg.temperature },
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_generation_response(&json)
}

/// Reachability probe against `health_path`.
pub async fn health(cfg: &LlmProviderConfig) -> Result<()> {
	let client = crate::client(cfg.timeout_ms)?;

	client
		.get(crate::endpoint(&cfg.api_base, &cfg.health_path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

fn parse_generation_response(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.or_else(|| json.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.ok_or_else(|| invalid_response("Generation response has no message content."))?;

	Ok(content.to_string())
}
