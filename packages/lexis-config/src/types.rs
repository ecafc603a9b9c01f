use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub retrieval: Retrieval,
	#[serde(default)]
	pub terms: Terms,
	#[serde(default)]
	pub messages: Messages,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
	/// Optional. Named dense vector to query; the collection's default vector is used when unset.
	pub vector_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Empty for self-hosted backends that take no credentials.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default = "default_health_path")]
	pub health_path: String,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	/// Tenant id reserved for the shared national-law pool.
	#[serde(default = "default_national_tenant_id")]
	pub national_tenant_id: i64,
	/// Combined number of documents handed to the generator.
	pub top_k: u32,
	/// Per-branch candidate count requested from the index.
	pub candidate_k: u32,
	#[serde(default = "default_rrf_k")]
	pub rrf_k: u32,
	/// Optional. Minimum backend similarity for a point to be returned at all.
	pub score_threshold: Option<f32>,
	#[serde(default)]
	pub fallback: RetrievalFallback,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetrievalFallback {
	pub quality_threshold: f32,
	pub min_quality_tenant: u32,
	pub relaxed_threshold: f32,
	pub fallback_tenant_keep: u32,
	pub tenant_share: f32,
}
impl Default for RetrievalFallback {
	fn default() -> Self {
		Self {
			quality_threshold: 0.7,
			min_quality_tenant: 2,
			relaxed_threshold: 0.65,
			fallback_tenant_keep: 2,
			tenant_share: 0.6,
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Terms {
	/// Extra abbreviation expansions merged over the built-in labor-law table.
	pub abbreviations: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
	/// Returned verbatim when neither pool produced a document and no system prompt exists.
	pub no_context: String,
	/// Returned to the requester when embedding or generation fails.
	pub processing_error: String,
}
impl Default for Messages {
	fn default() -> Self {
		Self {
			no_context: "Xin lỗi, tôi không tìm thấy quy định công ty hoặc văn bản pháp luật nào liên quan để trả lời câu hỏi này.".to_string(),
			processing_error: "Có lỗi xảy ra, vui lòng thử lại".to_string(),
		}
	}
}

fn default_health_path() -> String {
	"/api/tags".to_string()
}

fn default_national_tenant_id() -> i64 {
	1
}

fn default_rrf_k() -> u32 {
	60
}
