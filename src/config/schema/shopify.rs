use crate::shopify::WebhookTopic;
use serde::{Deserialize, Serialize};

/// Offline session loaded at startup into the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSeed {
    pub shop: String,
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    /// App client id (public)
    #[serde(default)]
    pub api_key: Option<String>,
    /// App client secret; also the webhook and app proxy signing key
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Public origin the app is served from
    #[serde(default)]
    pub app_url: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_webhook_topics")]
    pub webhook_topics: Vec<WebhookTopic>,
    /// Require a valid `signature` on app proxy requests (default: true)
    #[serde(default = "default_true")]
    pub verify_app_proxy: bool,
    /// Admin API origin override; defaults to `https://{shop}`
    #[serde(default)]
    pub admin_api_base: Option<String>,
    #[serde(default)]
    pub sessions: Vec<SessionSeed>,
}

fn default_scopes() -> Vec<String> {
    vec!["read_products".into()]
}

fn default_api_version() -> String {
    "2024-10".into()
}

fn default_webhook_topics() -> Vec<WebhookTopic> {
    vec![WebhookTopic::AppUninstalled, WebhookTopic::AppScopesUpdate]
}

fn default_true() -> bool {
    true
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            app_url: None,
            scopes: default_scopes(),
            api_version: default_api_version(),
            webhook_topics: default_webhook_topics(),
            verify_app_proxy: true,
            admin_api_base: None,
            sessions: Vec::new(),
        }
    }
}
