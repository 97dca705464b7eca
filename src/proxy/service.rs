use super::prompt::{PromptLimits, build_user_message, question_preview};
use super::traits::Provider;
use super::types::AskRequest;
use crate::config::AiConfig;
use crate::security::sanitize_api_error;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AskError {
    #[error("question is blank")]
    BlankQuestion,

    /// Sanitized provider failure; never shown to shoppers.
    #[error("completion provider failed: {0}")]
    Provider(String),
}

impl AskError {
    /// Message returned to the widget in `{"error": ...}`.
    pub fn public_message(&self) -> &str {
        match self {
            Self::BlankQuestion => "Question must not be empty",
            Self::Provider(_) => "The assistant is unavailable right now. Please try again.",
        }
    }
}

/// Turns widget questions into completion calls.
#[derive(Clone)]
pub struct AskService {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    system_prompt: String,
    limits: PromptLimits,
}

impl AskService {
    pub fn new(provider: Arc<dyn Provider>, ai: &AiConfig) -> Self {
        Self {
            provider,
            model: ai.model.clone(),
            temperature: ai.temperature,
            system_prompt: ai.system_prompt.clone(),
            limits: PromptLimits {
                max_question_chars: ai.max_question_chars,
                max_context_chars: ai.max_context_chars,
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn answer(&self, request: &AskRequest) -> Result<String, AskError> {
        if request.question.trim().is_empty() {
            return Err(AskError::BlankQuestion);
        }

        let message = build_user_message(&request.question, &request.product_context, self.limits);
        tracing::debug!(
            provider = self.provider.name(),
            question = %question_preview(&request.question),
            "answering storefront question"
        );

        self.provider
            .chat_with_system(
                Some(&self.system_prompt),
                &message,
                &self.model,
                self.temperature,
            )
            .await
            .map_err(|e| {
                let detail = sanitize_api_error(&format!("{e:#}"));
                tracing::warn!(provider = self.provider.name(), error = %detail, "completion failed");
                AskError::Provider(detail)
            })
    }
}
