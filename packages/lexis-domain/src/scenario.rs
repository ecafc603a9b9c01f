use serde::{Deserialize, Serialize};

use crate::document::ScoredDocument;

/// Retrieval outcome that selects the answering strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scenario {
	Both,
	CompanyOnly,
	LegalOnly,
	StaticContext,
	None,
}
impl Scenario {
	pub fn classify(
		tenant: &[ScoredDocument],
		global: &[ScoredDocument],
		static_prompt_provided: bool,
	) -> Self {
		match (!tenant.is_empty(), !global.is_empty()) {
			(true, true) => Self::Both,
			(true, false) => Self::CompanyOnly,
			(false, true) => Self::LegalOnly,
			(false, false) if static_prompt_provided => Self::StaticContext,
			(false, false) => Self::None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Both => "BOTH",
			Self::CompanyOnly => "COMPANY_ONLY",
			Self::LegalOnly => "LEGAL_ONLY",
			Self::StaticContext => "STATIC_CONTEXT",
			Self::None => "NONE",
		}
	}

	/// Whether retrieved documents back the answer.
	pub fn has_documents(self) -> bool {
		matches!(self, Self::Both | Self::CompanyOnly | Self::LegalOnly)
	}
}
impl std::fmt::Display for Scenario {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
