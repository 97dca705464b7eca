use super::gateway_harness::{GatewayTestServer, SECRET, SHOP, test_config};
use ama_storefront::config::Environment;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_reports_presence_and_sets_framing_headers() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;

    let response = reqwest::get(server.url("/health"))
        .await
        .expect("health request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-security-policy")
            .and_then(|v| v.to_str().ok()),
        Some("frame-ancestors https://admin.shopify.com https://*.myshopify.com")
    );
    assert_eq!(
        response
            .headers()
            .get("x-frame-options")
            .and_then(|v| v.to_str().ok()),
        Some("SAMEORIGIN")
    );

    let body: Value = response.json().await.expect("health should be json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["config"]["shopify_api_secret"], true);
    assert_eq!(body["config"]["sessions"], 1);
    assert!(!body.to_string().contains(SECRET));
}

#[tokio::test]
async fn landing_page_frames_only_the_requesting_shop() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;

    let response = reqwest::get(server.url(&format!("/?shop={SHOP}&host=YWRtaW4")))
        .await
        .expect("landing request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-security-policy")
            .and_then(|v| v.to_str().ok()),
        Some("frame-ancestors https://admin.shopify.com https://demo.myshopify.com")
    );
    let html = response.text().await.expect("landing page body");
    assert!(html.contains(SHOP));

    let spoofed = reqwest::get(server.url("/?shop=evil.example.com"))
        .await
        .expect("landing request should complete");
    assert_eq!(
        spoofed
            .headers()
            .get("content-security-policy")
            .and_then(|v| v.to_str().ok()),
        Some("frame-ancestors https://admin.shopify.com https://*.myshopify.com")
    );
}

#[tokio::test]
async fn debug_redacts_sensitive_headers() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;

    let body: Value = reqwest::Client::new()
        .get(server.url("/debug?probe=1"))
        .header("Authorization", "Bearer very-secret")
        .header("X-Shopify-Access-Token", "shpat_leak")
        .send()
        .await
        .expect("debug request should complete")
        .json()
        .await
        .expect("debug should be json");

    assert_eq!(body["request"]["method"], "GET");
    assert_eq!(body["request"]["path"], "/debug");
    assert_eq!(body["request"]["headers"]["authorization"], "[REDACTED]");
    assert_eq!(body["request"]["headers"]["x-shopify-access-token"], "[REDACTED]");
    let rendered = body.to_string();
    assert!(!rendered.contains("very-secret"));
    assert!(!rendered.contains("shpat_leak"));
    assert!(!rendered.contains(SECRET));
}

#[tokio::test]
async fn debug_is_closed_in_production_without_key() {
    let mut config = test_config("http://127.0.0.1:9/v1");
    config.environment = Environment::Production;
    config.debug.key = Some("let-me-in".to_string());
    let server = GatewayTestServer::start(config).await;
    let client = reqwest::Client::new();

    let denied = client
        .get(server.url("/debug"))
        .send()
        .await
        .expect("debug request should complete");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    let body: Value = denied.json().await.expect("forbidden should be json");
    assert!(body["error"].as_str().is_some());

    let allowed = client
        .get(server.url("/debug"))
        .header("x-debug-key", "let-me-in")
        .send()
        .await
        .expect("debug request should complete");
    assert_eq!(allowed.status(), StatusCode::OK);
}
