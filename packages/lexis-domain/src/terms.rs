use std::collections::HashSet;

use regex::Regex;

use crate::document::TermDefinition;

/// Built-in labor-law abbreviations and their expansions.
pub const LABOR_ABBREVIATIONS: &[(&str, &str)] = &[
	("BHXH", "Bảo hiểm xã hội"),
	("BHYT", "Bảo hiểm y tế"),
	("BHTN", "Bảo hiểm thất nghiệp"),
	("NLĐ", "Người lao động"),
	("NSDLĐ", "Người sử dụng lao động"),
	("CBNV", "Cán bộ nhân viên"),
	("CNVC", "Công nhân viên chức"),
	("PCCC", "Phòng cháy chữa cháy"),
	("ATVSLĐ", "An toàn vệ sinh lao động"),
	("HĐLĐ", "Hợp đồng lao động"),
];

/// Citation rules in emission order: articles, law codes, decrees, circulars, years. A rule with
/// a capture group emits the group instead of the whole match.
pub const LEGAL_CITATION_PATTERNS: &[&str] = &[
	r"(?i)\bđiều\s+\d+(?:\s*,?\s*khoản\s+\d+)?",
	r"(?i)\bbộ\s+luật(?:\s+\p{L}+){1,2}",
	r"(?i)\bnghị\s+định\s+(?:số\s+)?\d+/\d{4}/[\p{L}\-]+",
	r"(?i)\bthông\s+tư\s+(?:số\s+)?\d+/\d{4}/[\p{L}\-]+",
	r"(?i)\bnăm\s+\d{4}\b",
	// Bare years, except the year segment of a document number such as 145/2020/NĐ-CP.
	r"(?:^|[^\p{N}/])((?:19|20)\d{2})\b",
];

#[derive(Debug)]
struct Abbreviation {
	short: String,
	expansion: String,
	pattern: Regex,
}

/// Immutable rule tables consumed by [`TermExtractor`].
#[derive(Debug)]
pub struct TermRules {
	citations: Vec<Regex>,
	abbreviations: Vec<Abbreviation>,
}
impl TermRules {
	pub fn new<P, A, S, E>(citation_patterns: P, abbreviations: A) -> Result<Self, regex::Error>
	where
		P: IntoIterator,
		P::Item: AsRef<str>,
		A: IntoIterator<Item = (S, E)>,
		S: Into<String>,
		E: Into<String>,
	{
		let citations = citation_patterns
			.into_iter()
			.map(|pattern| Regex::new(pattern.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;
		let mut table: Vec<Abbreviation> = Vec::new();

		for (short, expansion) in abbreviations {
			let short = short.into();
			let expansion = expansion.into();

			if short.trim().is_empty() || expansion.trim().is_empty() {
				continue;
			}

			let folded = short.to_lowercase();

			if let Some(existing) = table.iter_mut().find(|entry| entry.short.to_lowercase() == folded)
			{
				existing.expansion = expansion;

				continue;
			}

			let pattern = Regex::new(&format!(
				r"(?i)(?:^|[^\p{{L}}\p{{N}}]){}(?:$|[^\p{{L}}\p{{N}}])",
				regex::escape(&short)
			))?;

			table.push(Abbreviation { short, expansion, pattern });
		}

		Ok(Self { citations, abbreviations: table })
	}

	/// Labor-law rules with `extra` abbreviations layered over the built-in table.
	pub fn labor_law<A, S, E>(extra: A) -> Result<Self, regex::Error>
	where
		A: IntoIterator<Item = (S, E)>,
		S: Into<String>,
		E: Into<String>,
	{
		let builtin = LABOR_ABBREVIATIONS
			.iter()
			.map(|(short, expansion)| (short.to_string(), expansion.to_string()));
		let extra = extra.into_iter().map(|(short, expansion)| (short.into(), expansion.into()));

		Self::new(LEGAL_CITATION_PATTERNS, builtin.chain(extra))
	}
}

#[derive(Debug)]
pub struct TermExtractor {
	rules: TermRules,
}
impl TermExtractor {
	pub fn new(rules: TermRules) -> Self {
		Self { rules }
	}

	/// Lowercased keywords found in `query`, deduplicated in first-seen order.
	pub fn extract(&self, query: &str, terminology: &[TermDefinition]) -> Vec<String> {
		let mut keywords = Keywords::default();

		if query.trim().is_empty() {
			return keywords.into_vec();
		}

		for pattern in &self.rules.citations {
			for caps in pattern.captures_iter(query) {
				if let Some(found) = caps.get(1).or_else(|| caps.get(0)) {
					keywords.push(found.as_str());
				}
			}
		}
		for entry in &self.rules.abbreviations {
			if entry.pattern.is_match(query) {
				keywords.push(&entry.short);
				keywords.push(&entry.expansion);
			}
		}
		for term in terminology {
			if term.key.trim().is_empty() || !query.contains(term.key.as_str()) {
				continue;
			}

			keywords.push(&term.key);
			keywords.push(&term.value);
		}

		keywords.into_vec()
	}
}

#[derive(Default)]
struct Keywords {
	seen: HashSet<String>,
	ordered: Vec<String>,
}
impl Keywords {
	fn push(&mut self, raw: &str) {
		let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

		if normalized.is_empty() || !self.seen.insert(normalized.clone()) {
			return;
		}

		self.ordered.push(normalized);
	}

	fn into_vec(self) -> Vec<String> {
		self.ordered
	}
}
