use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

use lexis_domain::{ConversationTurn, PromptInput, Scenario, TermDefinition, assemble};

use crate::{Error, LexisService, Result};

/// `model_used` reported when no generation call was made.
pub const NO_MODEL: &str = "none";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatRequest {
	pub conversation_id: i64,
	pub user_id: i64,
	pub tenant_id: i64,
	pub message: String,
	#[serde(default)]
	pub terminology: Vec<TermDefinition>,
	/// Tenant persona or role description; a non-blank value enables STATIC_CONTEXT.
	#[serde(default)]
	pub system_prompt: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatResponse {
	pub conversation_id: i64,
	pub user_id: i64,
	pub message: String,
	pub model_used: String,
	pub rag_documents_used: usize,
	pub source_ids: Vec<i64>,
	pub scenario: Scenario,
	pub fallback_triggered: bool,
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
}

impl LexisService {
	pub async fn process(&self, req: ChatRequest) -> Result<ChatResponse> {
		let session_id = session_id();
		let span = tracing::info_span!(
			"chat",
			conversation_id = req.conversation_id,
			user_id = req.user_id,
			tenant_id = req.tenant_id,
			session_id = %session_id
		);

		self.answer(req).instrument(span).await
	}

	async fn answer(&self, req: ChatRequest) -> Result<ChatResponse> {
		let question = req.message.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest { message: "message must be non-empty.".to_string() });
		}

		let keywords = self.terms.extract(question, &req.terminology);

		tracing::debug!(keywords = ?keywords, "Extracted query keywords.");

		let vector = self.embed_query(question).await?;
		let hits = self.hybrid_search(&vector, &keywords, req.tenant_id).await;
		let limit = self.cfg.retrieval.top_k as usize;
		let outcome = self.fallback.apply(&hits.tenant, &hits.global, limit);

		if outcome.fallback_triggered {
			tracing::warn!(
				tenant_candidates = hits.tenant.len(),
				global_kept = outcome.global.len(),
				"Company regulations are sparse. Widening to national law."
			);
		}

		let system_prompt =
			req.system_prompt.as_deref().map(str::trim).filter(|prompt| !prompt.is_empty());
		let scenario = Scenario::classify(&outcome.tenant, &outcome.global, system_prompt.is_some());

		tracing::info!(
			scenario = scenario.as_str(),
			tenant_docs = outcome.tenant.len(),
			global_docs = outcome.global.len(),
			"Classified retrieval outcome."
		);

		let context = assemble(&outcome.tenant, &outcome.global, scenario);
		let turns = self.prompts.build(PromptInput {
			scenario,
			question,
			context: &context,
			system_prompt,
			terminology: &req.terminology,
			fallback_triggered: outcome.fallback_triggered,
		});
		let Some(turns) = turns else {
			return Ok(ChatResponse {
				conversation_id: req.conversation_id,
				user_id: req.user_id,
				message: self.cfg.messages.no_context.clone(),
				model_used: NO_MODEL.to_string(),
				rag_documents_used: 0,
				source_ids: Vec::new(),
				scenario,
				fallback_triggered: outcome.fallback_triggered,
				timestamp: OffsetDateTime::now_utc(),
			});
		};
		let messages = to_messages(&turns);
		let raw = self
			.providers
			.generation
			.generate(&self.cfg.providers.llm, &messages)
			.await
			.map_err(|err| Error::Generation { message: err.to_string() })?;
		let answer = self.cleaner.cleanup(&raw);

		tracing::info!(raw_chars = raw.len(), answer_chars = answer.len(), "Generated answer.");

		Ok(ChatResponse {
			conversation_id: req.conversation_id,
			user_id: req.user_id,
			message: answer,
			model_used: self.cfg.providers.llm.model.clone(),
			rag_documents_used: context.documents_used,
			source_ids: context.source_ids,
			scenario,
			fallback_triggered: outcome.fallback_triggered,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	async fn embed_query(&self, question: &str) -> Result<Vec<f32>> {
		let texts = vec![question.to_string()];
		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &texts)
			.await
			.map_err(|err| Error::Embedding { message: err.to_string() })?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Embedding {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Embedding {
				message: format!(
					"Embedding has {} dimensions, expected {}.",
					vector.len(),
					self.cfg.storage.qdrant.vector_dim
				),
			});
		}

		Ok(vector)
	}
}

fn to_messages(turns: &[ConversationTurn]) -> Vec<Value> {
	turns
		.iter()
		.map(|turn| serde_json::json!({ "role": turn.role.as_str(), "content": turn.content }))
		.collect()
}

/// Short per-message id correlating log lines of one query.
fn session_id() -> String {
	let mut id = Uuid::new_v4().simple().to_string();

	id.truncate(8);

	id
}
