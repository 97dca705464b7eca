use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful shopping assistant embedded on a \
product page. Answer the shopper's question using only the product information and reviews \
provided. If the information is not available, say so briefly. Keep answers under 80 words.";

/// OpenAI-compatible completion endpoint used to answer shopper questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

fn default_max_question_chars() -> usize {
    500
}

fn default_max_context_chars() -> usize {
    4_000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
            max_question_chars: default_max_question_chars(),
            max_context_chars: default_max_context_chars(),
        }
    }
}
