pub mod chat;
pub mod retrieval;

mod error;

pub use chat::{ChatRequest, ChatResponse};
pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use qdrant_client::qdrant::ScoredPoint;
use serde_json::Value;

use lexis_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use lexis_domain::{
	CleanupRules, PromptSelector, ResponseCleaner, ScopeFallback, TermExtractor, TermRules,
};
use lexis_providers::{embedding, generation};
use lexis_storage::qdrant::{QdrantStore, ScopeSearch};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, lexis_providers::Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, lexis_providers::Result<String>>;

	fn health<'a>(&'a self, cfg: &'a LlmProviderConfig) -> BoxFuture<'a, lexis_providers::Result<()>>;
}

/// Ranked nearest-neighbour lookups over the document collection.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		request: ScopeSearch<'a>,
	) -> BoxFuture<'a, lexis_storage::Result<Vec<ScoredPoint>>>;

	fn health<'a>(&'a self) -> BoxFuture<'a, lexis_storage::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, generation }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders);

		Self { embedding: provider.clone(), generation: provider }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthReport {
	pub llm: bool,
	pub qdrant: bool,
}
impl HealthReport {
	pub fn is_healthy(&self) -> bool {
		self.llm && self.qdrant
	}
}

pub struct LexisService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
	terms: TermExtractor,
	fallback: ScopeFallback,
	prompts: PromptSelector,
	cleaner: ResponseCleaner,
}
impl LexisService {
	pub fn new(cfg: Config, qdrant: QdrantStore) -> Result<Self> {
		Self::with_backends(cfg, Arc::new(qdrant), Providers::default())
	}

	pub fn with_backends(
		cfg: Config,
		index: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> Result<Self> {
		let rules = TermRules::labor_law(
			cfg.terms.abbreviations.iter().map(|(short, expansion)| (short.clone(), expansion.clone())),
		)
		.map_err(|err| Error::Configuration { message: format!("Term rules: {err}") })?;
		let cleanup = CleanupRules::standard()
			.map_err(|err| Error::Configuration { message: format!("Cleanup rules: {err}") })?;
		let fallback = ScopeFallback::from(&cfg.retrieval.fallback);

		Ok(Self {
			cfg,
			index,
			providers,
			terms: TermExtractor::new(rules),
			fallback,
			prompts: PromptSelector::default(),
			cleaner: ResponseCleaner::new(cleanup),
		})
	}

	/// Probes the generator and the index concurrently.
	pub async fn health(&self) -> HealthReport {
		let (llm, qdrant) = tokio::join!(
			self.providers.generation.health(&self.cfg.providers.llm),
			self.index.health()
		);

		if let Err(err) = &llm {
			tracing::warn!(error = %err, "Generation backend health probe failed.");
		}
		if let Err(err) = &qdrant {
			tracing::warn!(error = %err, "Qdrant health probe failed.");
		}

		HealthReport { llm: llm.is_ok(), qdrant: qdrant.is_ok() }
	}
}

struct HttpProviders;
impl EmbeddingProvider for HttpProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, lexis_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl GenerationProvider for HttpProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, lexis_providers::Result<String>> {
		Box::pin(generation::generate(cfg, messages))
	}

	fn health<'a>(&'a self, cfg: &'a LlmProviderConfig) -> BoxFuture<'a, lexis_providers::Result<()>> {
		Box::pin(generation::health(cfg))
	}
}

impl VectorIndex for QdrantStore {
	fn search<'a>(
		&'a self,
		request: ScopeSearch<'a>,
	) -> BoxFuture<'a, lexis_storage::Result<Vec<ScoredPoint>>> {
		Box::pin(QdrantStore::search(self, request))
	}

	fn health<'a>(&'a self) -> BoxFuture<'a, lexis_storage::Result<()>> {
		Box::pin(QdrantStore::health(self))
	}
}
