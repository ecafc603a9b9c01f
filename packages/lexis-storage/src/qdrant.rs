use qdrant_client::qdrant::{Condition, Filter, MinShould, Query, QueryPointsBuilder, ScoredPoint};

use crate::{Error, Result};

/// Payload key holding the passage text; keyword matching runs against its full-text index.
pub const TEXT_FIELD: &str = "text";
/// Payload key partitioning company regulations by tenant; national law lives under its own id.
pub const TENANT_FIELD: &str = "tenant_id";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	pub vector_name: Option<String>,
}
impl QdrantStore {
	pub fn new(cfg: &lexis_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			vector_name: cfg.vector_name.clone(),
		})
	}

	/// Nearest-neighbour search restricted to one tenant. With keywords, only points whose text
	/// matches at least one keyword are considered.
	pub async fn search(&self, request: ScopeSearch<'_>) -> Result<Vec<ScoredPoint>> {
		if request.vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidSearch(format!(
				"Query vector has {} dimensions, collection expects {}.",
				request.vector.len(),
				self.vector_dim
			)));
		}

		let mut query = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(request.vector.to_vec()))
			.filter(scope_filter(request.tenant_id, request.keywords))
			.limit(request.limit)
			.with_payload(true);

		if let Some(name) = self.vector_name.as_deref() {
			query = query.using(name);
		}
		if let Some(threshold) = request.score_threshold {
			query = query.score_threshold(threshold);
		}

		Ok(self.client.query(query).await?.result)
	}

	pub async fn health(&self) -> Result<()> {
		self.client.health_check().await?;

		Ok(())
	}
}

#[derive(Clone, Copy, Debug)]
pub struct ScopeSearch<'a> {
	pub tenant_id: i64,
	pub vector: &'a [f32],
	/// Empty for a pure vector search.
	pub keywords: &'a [String],
	pub limit: u64,
	pub score_threshold: Option<f32>,
}

/// Pins the tenant and, when keywords are given, requires a full-text hit on at least one of
/// them. Keyword matching only narrows the candidates; ordering stays by vector similarity.
pub fn scope_filter(tenant_id: i64, keywords: &[String]) -> Filter {
	let conditions: Vec<Condition> = keywords
		.iter()
		.filter(|keyword| !keyword.trim().is_empty())
		.map(|keyword| Condition::matches_text(TEXT_FIELD, keyword.clone()))
		.collect();
	let min_should =
		if conditions.is_empty() { None } else { Some(MinShould { min_count: 1, conditions }) };

	Filter {
		must: vec![Condition::matches(TENANT_FIELD, tenant_id)],
		should: Vec::new(),
		must_not: Vec::new(),
		min_should,
	}
}
