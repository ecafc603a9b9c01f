use serde::Serialize;

use crate::{document::ScoredDocument, scenario::Scenario};

pub const COMPANY_SECTION_HEADING: &str = "=== QUY ĐỊNH CÔNG TY ===";
pub const LAW_SECTION_HEADING: &str = "=== VĂN BẢN PHÁP LUẬT ===";

const COMPANY_PLACEHOLDER: &str = "Quy định";
const LAW_PLACEHOLDER: &str = "Văn bản luật";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceContext {
	pub text: String,
	pub source_ids: Vec<i64>,
	pub documents_used: usize,
}
impl ComplianceContext {
	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}
}

/// Renders company regulations first, then national law, each document under its citation label.
pub fn assemble(
	tenant: &[ScoredDocument],
	global: &[ScoredDocument],
	scenario: Scenario,
) -> ComplianceContext {
	if !scenario.has_documents() {
		return ComplianceContext::default();
	}

	let mut sections = Vec::with_capacity(2);
	let mut source_ids = Vec::new();

	if let Some(section) = render_section(COMPANY_SECTION_HEADING, COMPANY_PLACEHOLDER, tenant) {
		sections.push(section);
	}
	if let Some(section) = render_section(LAW_SECTION_HEADING, LAW_PLACEHOLDER, global) {
		sections.push(section);
	}

	for source_id in tenant.iter().chain(global).filter_map(|doc| doc.source_id) {
		if !source_ids.contains(&source_id) {
			source_ids.push(source_id);
		}
	}

	ComplianceContext {
		text: sections.join("\n\n"),
		source_ids,
		documents_used: tenant.len() + global.len(),
	}
}

fn render_section(heading: &str, placeholder: &str, docs: &[ScoredDocument]) -> Option<String> {
	if docs.is_empty() {
		return None;
	}

	let mut out = String::from(heading);

	for (idx, doc) in docs.iter().enumerate() {
		let label =
			doc.citation_label().unwrap_or_else(|| format!("{placeholder} #{}", idx + 1));

		out.push_str("\n\n[");
		out.push_str(&label);
		out.push_str("]\n");
		out.push_str(doc.text.trim());
	}

	Some(out)
}
