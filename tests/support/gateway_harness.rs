use ama_storefront::config::{Config, Environment, SessionSeed};
use ama_storefront::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const SECRET: &str = "shpss_integration_secret";
pub const SHOP: &str = "demo.myshopify.com";

pub struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _workspace: TempDir,
}

/// Valid config pointing the completion client at `ai_base_url`.
pub fn test_config(ai_base_url: &str) -> Config {
    let mut config = Config::default();
    config.environment = Environment::Test;
    config.shopify.api_secret = Some(SECRET.to_string());
    config.shopify.api_key = Some("client-id".to_string());
    config.shopify.app_url = Some("https://ama.example.com".to_string());
    config.shopify.sessions = vec![SessionSeed {
        shop: SHOP.to_string(),
        access_token: "shpat_integration".to_string(),
        scope: Some("read_products".to_string()),
    }];
    config.ai.base_url = ai_base_url.to_string();
    config.ai.api_key = Some("sk-integration".to_string());
    config.ai.timeout_secs = 5;
    config
}

impl GatewayTestServer {
    pub async fn start(mut config: Config) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        config.config_path = workspace.path().join("config.toml");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let host = "127.0.0.1".to_string();
        let config = Arc::new(config);
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            handle,
            _workspace: workspace,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}
