use lexis_config::EmbeddingProviderConfig;
use serde_json::Value;

use crate::{Result, error::invalid_response};

pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = crate::client(cfg.timeout_ms)?;
	let mut body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});

	// Single-text services read `text`.
	if let [text] = texts {
		body["text"] = Value::String(text.clone());
	}

	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(&json)
}

/// Accepts `data[].embedding` ordered by `index`, `embeddings: [[...]]`, or a bare `vector`.
fn parse_embedding_response(json: &Value) -> Result<Vec<Vec<f32>>> {
	if let Some(data) = json.get("data").and_then(Value::as_array) {
		let mut indexed = Vec::with_capacity(data.len());

		for (position, item) in data.iter().enumerate() {
			let index =
				item.get("index").and_then(Value::as_u64).map(|v| v as usize).unwrap_or(position);
			let values = item
				.get("embedding")
				.ok_or_else(|| invalid_response("Embedding item has no embedding array."))?;

			indexed.push((index, to_vector(values)?));
		}

		indexed.sort_by_key(|(index, _)| *index);

		return Ok(indexed.into_iter().map(|(_, vec)| vec).collect());
	}
	if let Some(rows) = json.get("embeddings").and_then(Value::as_array) {
		return rows.iter().map(to_vector).collect();
	}
	if let Some(values) = json.get("vector") {
		return Ok(vec![to_vector(values)?]);
	}

	Err(invalid_response("Embedding response has no data, embeddings, or vector field."))
}

fn to_vector(values: &Value) -> Result<Vec<f32>> {
	let values =
		values.as_array().ok_or_else(|| invalid_response("Embedding must be an array."))?;

	values
		.iter()
		.map(|value| {
			value
				.as_f64()
				.map(|number| number as f32)
				.ok_or_else(|| invalid_response("Embedding value must be numeric."))
		})
		.collect()
}
