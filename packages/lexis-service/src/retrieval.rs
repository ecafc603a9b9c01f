use std::collections::HashMap;

use qdrant_client::qdrant::{ScoredPoint, Value, point_id::PointIdOptions, value::Kind};

use lexis_domain::{ScoredDocument, SearchScope, fuse};
use lexis_storage::qdrant::{ScopeSearch, TENANT_FIELD, TEXT_FIELD};

use crate::LexisService;

/// Fused per-scope results, before the fallback split.
#[derive(Clone, Debug, Default)]
pub struct ScopeHits {
	pub tenant: Vec<ScoredDocument>,
	pub global: Vec<ScoredDocument>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Branch {
	Vector,
	Keyword,
}
impl Branch {
	fn as_str(self) -> &'static str {
		match self {
			Self::Vector => "vector",
			Self::Keyword => "keyword",
		}
	}
}

impl LexisService {
	/// Searches the requester's company pool and the national-law pool concurrently. A failing
	/// branch contributes nothing instead of failing the query.
	pub async fn hybrid_search(
		&self,
		vector: &[f32],
		keywords: &[String],
		tenant_id: i64,
	) -> ScopeHits {
		let national_tenant_id = self.cfg.retrieval.national_tenant_id;

		// The national pool already covers its own tenant.
		if tenant_id == national_tenant_id {
			let global =
				self.search_scope(SearchScope::Global, national_tenant_id, vector, keywords).await;

			return ScopeHits { tenant: Vec::new(), global };
		}

		let (tenant, global) = tokio::join!(
			self.search_scope(SearchScope::Tenant, tenant_id, vector, keywords),
			self.search_scope(SearchScope::Global, national_tenant_id, vector, keywords)
		);

		tracing::debug!(
			tenant_hits = tenant.len(),
			global_hits = global.len(),
			"Scope searches finished."
		);

		ScopeHits { tenant, global }
	}

	async fn search_scope(
		&self,
		scope: SearchScope,
		tenant_id: i64,
		vector: &[f32],
		keywords: &[String],
	) -> Vec<ScoredDocument> {
		let vector_branch = self.search_branch(scope, Branch::Vector, tenant_id, vector, &[]);
		let keyword_branch = async {
			if keywords.is_empty() {
				return Vec::new();
			}

			self.search_branch(scope, Branch::Keyword, tenant_id, vector, keywords).await
		};
		let (vector_hits, keyword_hits) = tokio::join!(vector_branch, keyword_branch);

		fuse(&vector_hits, &keyword_hits, self.cfg.retrieval.rrf_k)
	}

	async fn search_branch(
		&self,
		scope: SearchScope,
		branch: Branch,
		tenant_id: i64,
		vector: &[f32],
		keywords: &[String],
	) -> Vec<ScoredDocument> {
		let request = ScopeSearch {
			tenant_id,
			vector,
			keywords,
			limit: u64::from(self.cfg.retrieval.candidate_k),
			score_threshold: self.cfg.retrieval.score_threshold,
		};

		match self.index.search(request).await {
			Ok(points) => points_to_documents(points, tenant_id),
			Err(err) => {
				tracing::warn!(
					error = %err,
					scope = scope.as_str(),
					branch = branch.as_str(),
					"Search branch failed. Continuing without its results."
				);

				Vec::new()
			},
		}
	}
}

/// Converts index hits into documents, dropping points that carry no passage text.
pub fn points_to_documents(points: Vec<ScoredPoint>, tenant_id: i64) -> Vec<ScoredDocument> {
	let mut out = Vec::with_capacity(points.len());

	for point in points {
		let Some(id) = point_id(&point) else {
			tracing::warn!("Skipping search hit without a point id.");

			continue;
		};
		let Some(text) = payload_string(&point.payload, TEXT_FIELD) else {
			tracing::warn!(point_id = %id, "Skipping search hit without text payload.");

			continue;
		};

		out.push(ScoredDocument {
			score: point.score,
			similarity: point.score,
			text,
			tenant_id: payload_i64(&point.payload, TENANT_FIELD).unwrap_or(tenant_id),
			document_name: payload_string(&point.payload, "document_name"),
			heading1: payload_string(&point.payload, "heading1"),
			heading2: payload_string(&point.payload, "heading2"),
			source_id: payload_i64(&point.payload, "source_id"),
			id,
		});
	}

	out
}

fn point_id(point: &ScoredPoint) -> Option<String> {
	match point.id.as_ref()?.point_id_options.as_ref()? {
		PointIdOptions::Uuid(id) => Some(id.clone()),
		PointIdOptions::Num(id) => Some(id.to_string()),
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	match &payload.get(key)?.kind {
		Some(Kind::StringValue(text)) if !text.trim().is_empty() => Some(text.clone()),
		_ => None,
	}
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	match &payload.get(key)?.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) if value.fract() == 0.0 => Some(*value as i64),
		Some(Kind::StringValue(text)) => text.trim().parse().ok(),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use qdrant_client::qdrant::PointId;

	use super::*;

	fn point(id: PointId, score: f32, payload: &[(&str, Value)]) -> ScoredPoint {
		ScoredPoint {
			id: Some(id),
			payload: payload.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
			score,
			..Default::default()
		}
	}

	#[test]
	fn converts_payload_fields() {
		let docs = points_to_documents(
			vec![point(
				PointId::from(7_u64),
				0.82,
				&[
					("text", Value::from("Người lao động được nghỉ 12 ngày.")),
					("tenant_id", Value::from(1_i64)),
					("source_id", Value::from(55.0_f64)),
					("document_name", Value::from("Bộ luật Lao động 2019")),
					("heading1", Value::from("Điều 113")),
				],
			)],
			9,
		);

		assert_eq!(docs.len(), 1);
		assert_eq!(docs[0].id, "7");
		assert_eq!(docs[0].tenant_id, 1);
		assert_eq!(docs[0].source_id, Some(55));
		assert_eq!(docs[0].similarity, 0.82);
		assert_eq!(docs[0].citation_label().as_deref(), Some("Bộ luật Lao động 2019 > Điều 113"));
	}

	#[test]
	fn skips_points_without_text() {
		let docs = points_to_documents(
			vec![
				point(PointId::from("a1b2".to_string()), 0.9, &[("source_id", Value::from(1_i64))]),
				point(
					PointId::from("c3d4".to_string()),
					0.8,
					&[("text", Value::from("Có nội dung"))],
				),
			],
			4,
		);

		assert_eq!(docs.len(), 1);
		assert_eq!(docs[0].id, "c3d4");
		assert_eq!(docs[0].tenant_id, 4);
		assert_eq!(docs[0].source_id, None);
	}
}
