use crate::error::WidgetError;
use crate::proxy::AskRequest;
use crate::proxy::http_client::build_http_client;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Storefront path the app proxy forwards to `/proxy/ask`.
pub const DEFAULT_PROXY_PATH: &str = "/apps/ama/ask";

/// Raw backend reply; classification happens in the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".into()),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait AskTransport: Send + Sync {
    async fn post_question(&self, request: &AskRequest) -> Result<TransportResponse, WidgetError>;
}

#[async_trait]
impl<T: AskTransport + ?Sized> AskTransport for Arc<T> {
    async fn post_question(&self, request: &AskRequest) -> Result<TransportResponse, WidgetError> {
        (**self).post_question(request).await
    }
}

/// Posts questions to the storefront's app proxy over HTTP.
pub struct HttpAskTransport {
    client: Client,
    endpoint: Url,
}

impl HttpAskTransport {
    pub fn new(storefront_base: &str, proxy_path: &str) -> Result<Self, WidgetError> {
        let endpoint = Url::parse(storefront_base)
            .and_then(|base| base.join(proxy_path))
            .map_err(|e| WidgetError::Network(format!("invalid endpoint: {e}")))?;
        Ok(Self {
            client: build_http_client(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AskTransport for HttpAskTransport {
    async fn post_question(&self, request: &AskRequest) -> Result<TransportResponse, WidgetError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WidgetError::Timeout
                } else {
                    WidgetError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .text()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
