mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Messages, Providers, Qdrant, Retrieval,
	RetrievalFallback, Service, Storage, Terms,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw =
		fs::read_to_string(path).map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config =
		toml::from_str(&raw).map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	let temperature = cfg.providers.llm.temperature;

	if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	for (label, model) in
		[("embedding", &cfg.providers.embedding.model), ("llm", &cfg.providers.llm.model)]
	{
		if model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.model must be non-empty."),
			});
		}
	}

	let retrieval = &cfg.retrieval;

	if retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if retrieval.candidate_k < retrieval.top_k {
		return Err(Error::Validation {
			message: "retrieval.candidate_k must be at least retrieval.top_k.".to_string(),
		});
	}
	if retrieval.rrf_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.rrf_k must be greater than zero.".to_string(),
		});
	}
	if let Some(threshold) = retrieval.score_threshold {
		check_unit_range("retrieval.score_threshold", threshold)?;
	}

	let fallback = &retrieval.fallback;

	check_unit_range("retrieval.fallback.quality_threshold", fallback.quality_threshold)?;
	check_unit_range("retrieval.fallback.relaxed_threshold", fallback.relaxed_threshold)?;

	if fallback.relaxed_threshold > fallback.quality_threshold {
		return Err(Error::Validation {
			message: "retrieval.fallback.relaxed_threshold must not exceed retrieval.fallback.quality_threshold."
				.to_string(),
		});
	}
	if fallback.min_quality_tenant == 0 {
		return Err(Error::Validation {
			message: "retrieval.fallback.min_quality_tenant must be greater than zero.".to_string(),
		});
	}
	if !fallback.tenant_share.is_finite()
		|| fallback.tenant_share <= 0.0
		|| fallback.tenant_share > 1.0
	{
		return Err(Error::Validation {
			message: "retrieval.fallback.tenant_share must be greater than 0.0 and at most 1.0."
				.to_string(),
		});
	}

	for (abbreviation, expansion) in &cfg.terms.abbreviations {
		if abbreviation.trim().is_empty() || expansion.trim().is_empty() {
			return Err(Error::Validation {
				message: "terms.abbreviations entries must have non-empty keys and values."
					.to_string(),
			});
		}
	}

	for (label, message) in [
		("messages.no_context", &cfg.messages.no_context),
		("messages.processing_error", &cfg.messages.processing_error),
	] {
		if message.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	Ok(())
}

fn check_unit_range(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() || !(0.0..=1.0).contains(&value) {
		return Err(Error::Validation {
			message: format!("{label} must be in the range 0.0-1.0."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.vector_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage.qdrant.vector_name = None;
	}

	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim_end_matches('/').to_string();
	cfg.providers.llm.api_base = cfg.providers.llm.api_base.trim_end_matches('/').to_string();
	cfg.terms.abbreviations = std::mem::take(&mut cfg.terms.abbreviations)
		.into_iter()
		.map(|(abbreviation, expansion)| {
			(abbreviation.trim().to_string(), expansion.trim().to_string())
		})
		.collect();
}
