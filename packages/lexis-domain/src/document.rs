use serde::{Deserialize, Serialize};

/// A retrieved passage together with its ranking score and citation metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
	pub id: String,
	/// Score of the list the document currently sits in. Backend similarity before fusion, RRF
	/// score after.
	pub score: f32,
	/// Raw backend similarity, preserved across fusion.
	pub similarity: f32,
	pub text: String,
	pub tenant_id: i64,
	pub document_name: Option<String>,
	pub heading1: Option<String>,
	pub heading2: Option<String>,
	pub source_id: Option<i64>,
}
impl ScoredDocument {
	/// `document_name > heading1 > heading2` built from whichever fields are present.
	pub fn citation_label(&self) -> Option<String> {
		let parts: Vec<&str> = [&self.document_name, &self.heading1, &self.heading2]
			.into_iter()
			.filter_map(|part| part.as_deref().map(str::trim))
			.filter(|part| !part.is_empty())
			.collect();

		if parts.is_empty() { None } else { Some(parts.join(" > ")) }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
	/// Company regulations of the requesting tenant.
	Tenant,
	/// The shared national-law pool.
	Global,
}
impl SearchScope {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tenant => "tenant",
			Self::Global => "global",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::System => "system",
			Self::User => "user",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
	pub role: Role,
	pub content: String,
}
impl ConversationTurn {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: Role::System, content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}
}

/// One tenant vocabulary entry, e.g. `OT` -> `làm thêm giờ`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDefinition {
	pub key: String,
	pub value: String,
}
