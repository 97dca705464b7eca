use crate::utils::text::{normalize_whitespace, truncate_with_ellipsis};

#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    pub max_question_chars: usize,
    pub max_context_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_question_chars: 500,
            max_context_chars: 4_000,
        }
    }
}

/// User turn sent to the completion endpoint.
///
/// The product context block is omitted when the widget sent none.
pub fn build_user_message(question: &str, product_context: &str, limits: PromptLimits) -> String {
    let question = truncate_with_ellipsis(question.trim(), limits.max_question_chars);
    let context = product_context.trim();

    if context.is_empty() {
        return format!("Question: {question}");
    }

    let context = truncate_with_ellipsis(context, limits.max_context_chars);
    format!("Product information:\n{context}\n\nQuestion: {question}")
}

/// Collapse a question to a single line for logging.
pub fn question_preview(question: &str) -> String {
    truncate_with_ellipsis(&normalize_whitespace(question), 60)
}
