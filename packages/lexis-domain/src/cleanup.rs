use regex::Regex;

pub const STEP_MARKER_PATTERN: &str = r"(?i)\b(?:bước|step)\s+\d+\s*:";
pub const PREAMBLE_PATTERN: &str = r"(?i)^\s*(?:câu trả lời|trả lời|kết luận|tóm lại|phản hồi|final answer|answer|conclusion|response)\s*:\s*";
pub const META_LINE_PATTERN: &str = r"(?i)^\s*(?:dựa (?:trên|vào) (?:ngữ cảnh|thông tin|hướng dẫn|yêu cầu)|theo yêu cầu|tôi sẽ|sau đây là|dưới đây là|here is|based on the (?:context|instructions)|i will|let me)";
pub const CITATION_OPENER_PATTERN: &str = r"(?i)^\s*(?:theo|căn cứ|according to)\b";

/// Heuristics used by [`ResponseCleaner`]. Each field may be replaced independently.
#[derive(Clone, Debug)]
pub struct CleanupRules {
	pub step_marker: Regex,
	pub preamble: Regex,
	pub meta_line: Regex,
	pub citation_opener: Regex,
	pub max_preamble_passes: usize,
}
impl CleanupRules {
	pub fn standard() -> Result<Self, regex::Error> {
		Ok(Self {
			step_marker: Regex::new(STEP_MARKER_PATTERN)?,
			preamble: Regex::new(PREAMBLE_PATTERN)?,
			meta_line: Regex::new(META_LINE_PATTERN)?,
			citation_opener: Regex::new(CITATION_OPENER_PATTERN)?,
			max_preamble_passes: 5,
		})
	}
}

/// Best-effort removal of leaked reasoning and boilerplate from generated answers. Legitimate
/// text that happens to open with a listed phrase may be stripped as well.
#[derive(Clone, Debug)]
pub struct ResponseCleaner {
	rules: CleanupRules,
}
impl ResponseCleaner {
	pub fn new(rules: CleanupRules) -> Self {
		Self { rules }
	}

	pub fn cleanup(&self, raw: &str) -> String {
		let mut text = self.after_last_step(raw);

		for _ in 0..self.rules.max_preamble_passes {
			let Some(found) = self.rules.preamble.find(text) else {
				break;
			};

			text = &text[found.end()..];
		}

		let text = self.drop_meta_line(text.trim());

		if text.is_empty() { raw.trim().to_string() } else { text.to_string() }
	}

	fn after_last_step<'a>(&self, text: &'a str) -> &'a str {
		match self.rules.step_marker.find_iter(text).last() {
			Some(marker) => &text[marker.end()..],
			None => text,
		}
	}

	fn drop_meta_line<'a>(&self, text: &'a str) -> &'a str {
		let Some((first, rest)) = text.split_once('\n') else {
			return text;
		};
		let rest = rest.trim_start();
		let second = rest.lines().next().unwrap_or_default();

		if self.rules.meta_line.is_match(first) && self.rules.citation_opener.is_match(second) {
			rest
		} else {
			text
		}
	}
}
