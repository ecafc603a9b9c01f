use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use qdrant_client::qdrant::{PointId, ScoredPoint, Value as QdrantValue};
use serde_json::Value;

use lexis_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use lexis_domain::{Scenario, TermDefinition};
use lexis_service::{
	BoxFuture, ChatRequest, EmbeddingProvider, Error, GenerationProvider, LexisService, Providers,
	VectorIndex,
};
use lexis_storage::qdrant::ScopeSearch;

const TEST_CONFIG: &str = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "info"

[storage.qdrant]
url = "http://127.0.0.1:6334"
collection = "labor_documents"
vector_dim = 3

[providers.embedding]
provider_id = "test"
api_base = "http://127.0.0.1:1"
path = "/embed"
model = "embed"
dimensions = 3
timeout_ms = 1000

[providers.llm]
provider_id = "test"
api_base = "http://127.0.0.1:1"
path = "/api/chat"
model = "qwen2.5:7b"
temperature = 0.1
timeout_ms = 1000

[retrieval]
national_tenant_id = 1
top_k = 5
candidate_k = 10
"#;

fn test_config() -> Config {
	let cfg: Config = toml::from_str(TEST_CONFIG).expect("Failed to parse test config.");

	lexis_config::validate(&cfg).expect("Test config must be valid.");

	cfg
}

struct FixedEmbedding {
	dims: usize,
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, lexis_providers::Result<Vec<Vec<f32>>>> {
		let vec = vec![0.5; self.dims];

		Box::pin(async move { Ok(vec![vec; texts.len()]) })
	}
}

struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, lexis_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(lexis_providers::Error::InvalidResponse { message: "offline".to_string() })
		})
	}
}

#[derive(Default)]
struct SpyGenerator {
	calls: AtomicUsize,
	last_messages: Mutex<Vec<Value>>,
	reply: String,
	fail: bool,
}
impl SpyGenerator {
	fn replying(reply: &str) -> Self {
		Self { reply: reply.to_string(), ..Self::default() }
	}

	fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn prompt_text(&self) -> String {
		let messages = self.last_messages.lock().expect("Spy lock poisoned.");

		messages
			.iter()
			.filter_map(|message| message["content"].as_str())
			.collect::<Vec<_>>()
			.join("\n")
	}
}
impl GenerationProvider for SpyGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, lexis_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		*self.last_messages.lock().expect("Spy lock poisoned.") = messages.to_vec();

		let result = if self.fail {
			Err(lexis_providers::Error::InvalidResponse { message: "timeout".to_string() })
		} else {
			Ok(self.reply.clone())
		};

		Box::pin(async move { result })
	}

	fn health<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
	) -> BoxFuture<'a, lexis_providers::Result<()>> {
		Box::pin(async move { Ok(()) })
	}
}

/// Serves canned points per tenant; keyword searches get their own table.
#[derive(Default)]
struct FakeIndex {
	vector_hits: HashMap<i64, Vec<ScoredPoint>>,
	keyword_hits: HashMap<i64, Vec<ScoredPoint>>,
	/// `(tenant_id, keyword_branch)` pairs whose searches fail.
	failing: Vec<(i64, bool)>,
	searches: AtomicUsize,
}
impl FakeIndex {
	fn fail_scope(&mut self, tenant_id: i64) {
		self.failing.push((tenant_id, false));
		self.failing.push((tenant_id, true));
	}
}
impl VectorIndex for FakeIndex {
	fn search<'a>(
		&'a self,
		request: ScopeSearch<'a>,
	) -> BoxFuture<'a, lexis_storage::Result<Vec<ScoredPoint>>> {
		self.searches.fetch_add(1, Ordering::SeqCst);

		let keyword_branch = !request.keywords.is_empty();
		let result = if self.failing.contains(&(request.tenant_id, keyword_branch)) {
			Err(lexis_storage::Error::InvalidSearch("index unavailable".to_string()))
		} else {
			let table = if keyword_branch { &self.keyword_hits } else { &self.vector_hits };

			Ok(table.get(&request.tenant_id).cloned().unwrap_or_default())
		};

		Box::pin(async move { result })
	}

	fn health<'a>(&'a self) -> BoxFuture<'a, lexis_storage::Result<()>> {
		Box::pin(async move { Err(lexis_storage::Error::InvalidSearch("down".to_string())) })
	}
}

fn point(id: u64, score: f32, text: &str, source_id: i64) -> ScoredPoint {
	let payload: HashMap<String, QdrantValue> = [
		("text".to_string(), QdrantValue::from(text)),
		("source_id".to_string(), QdrantValue::from(source_id)),
	]
	.into_iter()
	.collect();

	ScoredPoint { id: Some(PointId::from(id)), payload, score, ..Default::default() }
}

fn request(tenant_id: i64, message: &str) -> ChatRequest {
	ChatRequest {
		conversation_id: 42,
		user_id: 7,
		tenant_id,
		message: message.to_string(),
		terminology: Vec::new(),
		system_prompt: None,
	}
}

fn service(index: FakeIndex, generator: Arc<SpyGenerator>) -> LexisService {
	let providers = Providers::new(Arc::new(FixedEmbedding { dims: 3 }), generator);

	LexisService::with_backends(test_config(), Arc::new(index), providers)
		.expect("Service must build.")
}

#[tokio::test]
async fn no_documents_and_no_prompt_skip_generation() {
	let generator = Arc::new(SpyGenerator::replying("unused"));
	let service = service(FakeIndex::default(), generator.clone());
	let response = service.process(request(5, "Chế độ thai sản?")).await.expect("process failed");

	assert_eq!(response.scenario, Scenario::None);
	assert_eq!(response.rag_documents_used, 0);
	assert_eq!(response.model_used, "none");
	assert_eq!(response.message, service.cfg.messages.no_context);
	assert_eq!(generator.count(), 0);
}

#[tokio::test]
async fn strong_global_documents_answer_legal_only() {
	let mut index = FakeIndex::default();

	index.vector_hits.insert(
		1,
		vec![
			point(11, 0.91, "Điều 113. Nghỉ hằng năm 12 ngày làm việc.", 113),
			point(12, 0.88, "Điều 114. Ngày nghỉ tăng theo thâm niên.", 114),
			point(13, 0.86, "Điều 115. Nghỉ việc riêng.", 115),
		],
	);

	let generator =
		Arc::new(SpyGenerator::replying("Bước 1: đọc.\nBước 2: Theo Điều 113, được 12 ngày."));
	let service = service(index, generator.clone());
	let response = service
		.process(request(5, "Nghỉ phép năm bao nhiêu ngày?"))
		.await
		.expect("process failed");

	assert_eq!(response.scenario, Scenario::LegalOnly);
	assert!(response.fallback_triggered);
	assert_eq!(response.rag_documents_used, 3);
	assert_eq!(response.source_ids, vec![113, 114, 115]);
	assert_eq!(response.message, "Theo Điều 113, được 12 ngày.");
	assert_eq!(response.model_used, "qwen2.5:7b");
	assert_eq!(generator.count(), 1);

	let prompt = generator.prompt_text();

	assert!(prompt.contains("=== VĂN BẢN PHÁP LUẬT ==="));
	assert!(!prompt.contains("=== QUY ĐỊNH CÔNG TY ==="));
}

#[tokio::test]
async fn company_and_law_documents_answer_both() {
	let mut index = FakeIndex::default();

	index.vector_hits.insert(
		5,
		vec![
			point(1, 0.92, "Công ty cho nghỉ 14 ngày phép.", 501),
			point(2, 0.81, "Phép năm được cộng dồn.", 502),
		],
	);
	index.vector_hits.insert(1, vec![point(11, 0.9, "Điều 113. Nghỉ hằng năm 12 ngày.", 113)]);

	let generator = Arc::new(SpyGenerator::replying("Trả lời: Công ty cho 14 ngày, cao hơn luật."));
	let service = service(index, generator.clone());
	let response = service
		.process(request(5, "Nghỉ phép năm bao nhiêu ngày?"))
		.await
		.expect("process failed");

	assert_eq!(response.scenario, Scenario::Both);
	assert!(!response.fallback_triggered);
	assert_eq!(response.source_ids, vec![501, 502, 113]);
	assert_eq!(response.message, "Công ty cho 14 ngày, cao hơn luật.");

	let prompt = generator.prompt_text();
	let company_at = prompt.find("=== QUY ĐỊNH CÔNG TY ===").expect("company section");
	let law_at = prompt.find("=== VĂN BẢN PHÁP LUẬT ===").expect("law section");

	assert!(company_at < law_at);
}

#[tokio::test]
async fn override_prompt_without_documents_uses_static_context() {
	let generator = Arc::new(SpyGenerator::replying("Tôi là trợ lý lễ tân."));
	let service = service(FakeIndex::default(), generator.clone());
	let mut req = request(5, "Bạn là ai?");

	req.system_prompt = Some("Bạn là trợ lý lễ tân của ACME.".to_string());
	req.terminology =
		vec![TermDefinition { key: "ACME".to_string(), value: "Công ty ACME".to_string() }];

	let response = service.process(req).await.expect("process failed");

	assert_eq!(response.scenario, Scenario::StaticContext);
	assert_eq!(response.rag_documents_used, 0);
	assert_eq!(generator.count(), 1);

	let prompt = generator.prompt_text();

	assert!(prompt.starts_with("Bạn là trợ lý lễ tân của ACME."));
	assert!(prompt.contains("- ACME: Công ty ACME"));
}

#[tokio::test]
async fn keyword_branch_is_fused_with_vector_branch() {
	let mut index = FakeIndex::default();

	index.vector_hits.insert(
		5,
		vec![
			point(1, 0.95, "Quy định A", 1),
			point(2, 0.9, "Quy định B", 2),
			point(3, 0.85, "Quy định C", 3),
			point(4, 0.8, "Quy định D", 4),
		],
	);
	index.keyword_hits.insert(5, vec![point(4, 0.8, "Quy định D", 4)]);

	let index = Arc::new(index);
	let providers = Providers::new(
		Arc::new(FixedEmbedding { dims: 3 }),
		Arc::new(SpyGenerator::replying("ok")),
	);
	let service = LexisService::with_backends(test_config(), index.clone(), providers)
		.expect("Service must build.");
	let response =
		service.process(request(5, "BHXH đóng thế nào?")).await.expect("process failed");

	// Vector and keyword branches for both scopes.
	assert_eq!(index.searches.load(Ordering::SeqCst), 4);
	assert_eq!(response.scenario, Scenario::CompanyOnly);
	assert_eq!(response.source_ids, vec![4, 1, 2]);
}

#[tokio::test]
async fn failing_branch_degrades_to_empty_scope() {
	let mut index = FakeIndex::default();

	index.fail_scope(5);
	index.vector_hits.insert(1, vec![point(11, 0.9, "Điều 113.", 113)]);

	let generator = Arc::new(SpyGenerator::replying("Theo Điều 113."));
	let service = service(index, generator.clone());
	let response = service.process(request(5, "Nghỉ phép?")).await.expect("process failed");

	assert_eq!(response.scenario, Scenario::LegalOnly);
	assert_eq!(generator.count(), 1);
}

#[tokio::test]
async fn failing_keyword_branch_keeps_vector_results() {
	let mut index = FakeIndex::default();

	index.vector_hits.insert(
		5,
		vec![point(1, 0.93, "BHXH do công ty đóng.", 1), point(2, 0.88, "Mức đóng BHXH.", 2)],
	);
	index.keyword_hits.insert(5, vec![point(9, 0.99, "Không được trả về.", 9)]);
	index.failing.push((5, true));

	let index = Arc::new(index);
	let providers = Providers::new(
		Arc::new(FixedEmbedding { dims: 3 }),
		Arc::new(SpyGenerator::replying("ok")),
	);
	let service = LexisService::with_backends(test_config(), index.clone(), providers)
		.expect("Service must build.");
	let response =
		service.process(request(5, "BHXH đóng thế nào?")).await.expect("process failed");

	assert_eq!(index.searches.load(Ordering::SeqCst), 4);
	assert_eq!(response.scenario, Scenario::CompanyOnly);
	assert!(!response.fallback_triggered);
	assert_eq!(response.source_ids, vec![1, 2]);
}

#[tokio::test]
async fn failing_global_scope_keeps_company_results() {
	let mut index = FakeIndex::default();

	index.vector_hits.insert(
		5,
		vec![point(1, 0.92, "Công ty cho nghỉ 14 ngày.", 501), point(2, 0.8, "Cộng dồn phép.", 502)],
	);
	index.vector_hits.insert(1, vec![point(11, 0.9, "Điều 113.", 113)]);
	index.fail_scope(1);

	let generator = Arc::new(SpyGenerator::replying("Công ty cho 14 ngày."));
	let service = service(index, generator.clone());
	let response = service.process(request(5, "Nghỉ phép?")).await.expect("process failed");

	assert_eq!(response.scenario, Scenario::CompanyOnly);
	assert_eq!(response.source_ids, vec![501, 502]);
	assert_eq!(generator.count(), 1);
	assert!(!generator.prompt_text().contains("=== VĂN BẢN PHÁP LUẬT ==="));
}

#[tokio::test]
async fn embedding_failure_is_fatal() {
	let generator = Arc::new(SpyGenerator::replying("unused"));
	let providers = Providers::new(Arc::new(FailingEmbedding), generator.clone());
	let service =
		LexisService::with_backends(test_config(), Arc::new(FakeIndex::default()), providers)
			.expect("Service must build.");
	let err = service.process(request(5, "Nghỉ phép?")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Embedding { .. }), "Unexpected error: {err:?}");
	assert_eq!(generator.count(), 0);
}

#[tokio::test]
async fn embedding_dimension_mismatch_is_fatal() {
	let generator = Arc::new(SpyGenerator::replying("unused"));
	let providers = Providers::new(Arc::new(FixedEmbedding { dims: 2 }), generator);
	let service =
		LexisService::with_backends(test_config(), Arc::new(FakeIndex::default()), providers)
			.expect("Service must build.");
	let err = service.process(request(5, "Nghỉ phép?")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Embedding { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn generation_failure_is_fatal() {
	let mut index = FakeIndex::default();

	index.vector_hits.insert(1, vec![point(11, 0.9, "Điều 113.", 113)]);

	let generator = Arc::new(SpyGenerator { fail: true, ..SpyGenerator::default() });
	let service = service(index, generator);
	let err = service.process(request(5, "Nghỉ phép?")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Generation { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn blank_message_is_rejected() {
	let generator = Arc::new(SpyGenerator::replying("unused"));
	let service = service(FakeIndex::default(), generator);
	let err = service.process(request(5, "   ")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn health_reports_each_backend() {
	let generator = Arc::new(SpyGenerator::replying("unused"));
	let service = service(FakeIndex::default(), generator);
	let report = service.health().await;

	assert!(report.llm);
	assert!(!report.qdrant);
	assert!(!report.is_healthy());
}
