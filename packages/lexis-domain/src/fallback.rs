use lexis_config::RetrievalFallback;

use crate::document::ScoredDocument;

/// Splits a combined result budget between the tenant and global scopes, widening to national
/// law when the tenant scope lacks strong matches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScopeFallback {
	pub quality_threshold: f32,
	pub min_quality_tenant: usize,
	pub relaxed_threshold: f32,
	pub fallback_tenant_keep: usize,
	pub tenant_share: f32,
}
impl ScopeFallback {
	pub fn apply(
		&self,
		tenant: &[ScoredDocument],
		global: &[ScoredDocument],
		limit: usize,
	) -> FallbackOutcome {
		if limit == 0 {
			return FallbackOutcome::default();
		}

		let quality_tenant =
			tenant.iter().filter(|doc| doc.similarity >= self.quality_threshold).count();

		if quality_tenant < self.min_quality_tenant {
			let keep = self.fallback_tenant_keep.min(limit).min(tenant.len());
			let global_budget = limit - keep;
			let global = global
				.iter()
				.filter(|doc| doc.similarity >= self.relaxed_threshold)
				.take(global_budget)
				.cloned()
				.collect();

			return FallbackOutcome {
				tenant: tenant[..keep].to_vec(),
				global,
				fallback_triggered: true,
			};
		}

		let tenant_budget = self.tenant_budget(limit);
		let global_budget = limit - tenant_budget;

		FallbackOutcome {
			tenant: tenant.iter().take(tenant_budget).cloned().collect(),
			global: global.iter().take(global_budget).cloned().collect(),
			fallback_triggered: false,
		}
	}

	fn tenant_budget(&self, limit: usize) -> usize {
		let share = (limit as f64 * f64::from(self.tenant_share)).round();

		(share as usize).clamp(1, limit)
	}
}
impl Default for ScopeFallback {
	fn default() -> Self {
		Self::from(&RetrievalFallback::default())
	}
}
impl From<&RetrievalFallback> for ScopeFallback {
	fn from(cfg: &RetrievalFallback) -> Self {
		Self {
			quality_threshold: cfg.quality_threshold,
			min_quality_tenant: cfg.min_quality_tenant as usize,
			relaxed_threshold: cfg.relaxed_threshold,
			fallback_tenant_keep: cfg.fallback_tenant_keep as usize,
			tenant_share: cfg.tenant_share,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FallbackOutcome {
	pub tenant: Vec<ScoredDocument>,
	pub global: Vec<ScoredDocument>,
	pub fallback_triggered: bool,
}
