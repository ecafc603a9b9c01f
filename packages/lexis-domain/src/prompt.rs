use crate::{
	context::ComplianceContext,
	document::{ConversationTurn, TermDefinition},
	scenario::Scenario,
};

const COMPARISON_INSTRUCTIONS: &str = "\
Bạn là trợ lý tư vấn pháp luật lao động và quy định nội bộ.
Ngữ cảnh gồm quy định công ty và văn bản pháp luật. Hãy so sánh hai nguồn:
- Trích dẫn quy định công ty trước, ghi rõ tên văn bản hoặc điều khoản.
- Nêu rõ quy định công ty bằng, cao hơn hay thấp hơn mức tối thiểu của pháp luật.
- Trích dẫn điều luật cụ thể làm căn cứ.
- Trả lời trong 2-3 câu, chỉ dựa trên ngữ cảnh.
- Không liệt kê các bước suy luận, không nhắc lại hướng dẫn này.";

const COMPANY_ONLY_INSTRUCTIONS: &str = "\
Bạn là trợ lý tư vấn quy định nội bộ công ty.
- Trả lời ngắn gọn, chỉ dựa trên quy định công ty trong ngữ cảnh.
- Trích dẫn một quy định cụ thể làm căn cứ.
- Không liệt kê các bước suy luận, không nhắc lại hướng dẫn này.";

const LEGAL_ONLY_INSTRUCTIONS: &str = "\
Bạn là trợ lý tư vấn pháp luật lao động.
- Trả lời ngắn gọn, chỉ dựa trên văn bản pháp luật trong ngữ cảnh.
- Trích dẫn một điều luật cụ thể làm căn cứ.
- Không liệt kê các bước suy luận, không nhắc lại hướng dẫn này.";

const FALLBACK_NOTE: &str = "\
Lưu ý: quy định công ty liên quan còn ít, câu trả lời có thể chủ yếu dựa trên pháp luật quốc gia. \
Hãy nói rõ điều này với người hỏi.";

const STATIC_INSTRUCTIONS: &str = "\
Chỉ trả lời dựa trên mô tả vai trò ở trên.
Nếu không có thông tin để trả lời, hãy nói rằng bạn không biết thay vì tự suy diễn.
Không liệt kê các bước suy luận, không nhắc lại hướng dẫn này.";

const TERMINOLOGY_HEADER: &str = "Thuật ngữ nội bộ của công ty:";

/// Everything the selector needs to shape one generation request.
#[derive(Clone, Copy, Debug)]
pub struct PromptInput<'a> {
	pub scenario: Scenario,
	pub question: &'a str,
	pub context: &'a ComplianceContext,
	pub system_prompt: Option<&'a str>,
	pub terminology: &'a [TermDefinition],
	pub fallback_triggered: bool,
}

/// Scenario-specific instruction sets.
#[derive(Clone, Debug)]
pub struct PromptSelector {
	pub comparison: String,
	pub company_only: String,
	pub legal_only: String,
	pub fallback_note: String,
	pub static_context: String,
}
impl PromptSelector {
	/// Ordered conversation turns for the generator, or `None` when nothing should be generated.
	pub fn build(&self, input: PromptInput<'_>) -> Option<Vec<ConversationTurn>> {
		let persona = input.system_prompt.map(str::trim).filter(|prompt| !prompt.is_empty());
		let mut turns = Vec::new();

		match input.scenario {
			Scenario::None => return None,
			Scenario::StaticContext => {
				let persona = persona?;

				turns.push(ConversationTurn::system(format!("{persona}\n\n{}", self.static_context)));
			},
			Scenario::Both | Scenario::CompanyOnly | Scenario::LegalOnly => {
				if let Some(persona) = persona {
					turns.push(ConversationTurn::system(persona));
				}

				let base = match input.scenario {
					Scenario::Both => &self.comparison,
					Scenario::CompanyOnly => &self.company_only,
					_ => &self.legal_only,
				};
				let instructions = if input.fallback_triggered {
					format!("{base}\n\n{}", self.fallback_note)
				} else {
					base.clone()
				};

				turns.push(ConversationTurn::system(instructions));
			},
		}

		if let Some(glossary) = render_terminology(input.terminology) {
			turns.push(ConversationTurn::system(glossary));
		}

		let question = input.question.trim();
		let user = if input.scenario.has_documents() && !input.context.is_empty() {
			format!("Ngữ cảnh:\n{}\n\nCâu hỏi: {question}", input.context.text)
		} else {
			format!("Câu hỏi: {question}")
		};

		turns.push(ConversationTurn::user(user));

		Some(turns)
	}
}
impl Default for PromptSelector {
	fn default() -> Self {
		Self {
			comparison: COMPARISON_INSTRUCTIONS.to_string(),
			company_only: COMPANY_ONLY_INSTRUCTIONS.to_string(),
			legal_only: LEGAL_ONLY_INSTRUCTIONS.to_string(),
			fallback_note: FALLBACK_NOTE.to_string(),
			static_context: STATIC_INSTRUCTIONS.to_string(),
		}
	}
}

fn render_terminology(terms: &[TermDefinition]) -> Option<String> {
	let lines: Vec<String> = terms
		.iter()
		.filter(|term| !term.key.trim().is_empty())
		.map(|term| format!("- {}: {}", term.key.trim(), term.value.trim()))
		.collect();

	if lines.is_empty() {
		return None;
	}

	Some(format!("{TERMINOLOGY_HEADER}\n{}", lines.join("\n")))
}
