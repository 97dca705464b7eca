use super::http_client::build_http_client_with_timeout;
use super::traits::Provider;
use crate::error::ProviderError;
use crate::security::{sanitize_api_error, scrub_secret_patterns};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Any endpoint speaking the OpenAI `chat/completions` dialect.
pub struct OpenAiCompatibleProvider {
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cached_auth_header: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| format!("Bearer {k}")),
            client: build_http_client_with_timeout(timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys,
            });
        }
        messages.push(Message {
            role: "user",
            content: message,
        });
        ChatRequest {
            model,
            messages,
            temperature,
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let endpoint = self.endpoint();
        let request = Self::build_request(system_prompt, message, model, temperature);

        let mut builder = self.client.post(&endpoint).json(&request);
        if let Some(auth) = &self.cached_auth_header {
            builder = builder.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = builder.send().await.map_err(|e| ProviderError::Request {
            endpoint: endpoint.clone(),
            message: scrub_secret_patterns(&e.to_string()).into_owned(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            }
            .into());
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ProviderError::Request {
            endpoint,
            message: format!("invalid response body: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::EmptyAnswer.into())
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
