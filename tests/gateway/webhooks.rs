use super::gateway_harness::{GatewayTestServer, SECRET, SHOP, test_config};
use ama_storefront::security::compute_webhook_hmac;
use reqwest::StatusCode;
use serde_json::Value;

fn signed(
    client: &reqwest::Client,
    url: String,
    topic: &str,
    webhook_id: &str,
    body: &'static str,
) -> reqwest::RequestBuilder {
    let hmac = compute_webhook_hmac(SECRET.as_bytes(), body.as_bytes())
        .expect("hmac should compute");
    client
        .post(url)
        .header("Content-Type", "application/json")
        .header("X-Shopify-Hmac-Sha256", hmac)
        .header("X-Shopify-Topic", topic)
        .header("X-Shopify-Shop-Domain", SHOP)
        .header("X-Shopify-Webhook-Id", webhook_id)
        .body(body)
}

#[tokio::test]
async fn tampered_webhook_is_rejected_and_state_untouched() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;
    let client = reqwest::Client::new();
    let original = r#"{"myshopify_domain":"demo.myshopify.com"}"#;
    let hmac = compute_webhook_hmac(SECRET.as_bytes(), original.as_bytes()).unwrap();

    let response = client
        .post(server.url("/webhooks"))
        .header("X-Shopify-Hmac-Sha256", hmac)
        .header("X-Shopify-Topic", "app/uninstalled")
        .header("X-Shopify-Shop-Domain", SHOP)
        .body(r#"{"myshopify_domain":"other.myshopify.com"}"#)
        .send()
        .await
        .expect("webhook request should complete");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let health: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["config"]["sessions"], 1);

    let debug: Value = reqwest::get(server.url("/debug")).await.unwrap().json().await.unwrap();
    assert_eq!(debug["sessions"], 1);
}

#[tokio::test]
async fn uninstall_then_duplicate_delivery() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;
    let client = reqwest::Client::new();
    let body = r#"{"id":1,"myshopify_domain":"demo.myshopify.com"}"#;

    let first = signed(&client, server.url("/webhooks"), "app/uninstalled", "w-int-1", body)
        .send()
        .await
        .expect("webhook request should complete");
    assert_eq!(first.status(), StatusCode::OK);
    let first: Value = first.json().await.unwrap();
    assert_eq!(first["sessions_removed"], 1);

    let again: Value = signed(&client, server.url("/webhooks"), "app/uninstalled", "w-int-1", body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["status"], "duplicate");

    let debug: Value = reqwest::get(server.url("/debug")).await.unwrap().json().await.unwrap();
    assert_eq!(debug["sessions"], 0);
}

#[tokio::test]
async fn unknown_topic_and_bad_json() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;
    let client = reqwest::Client::new();

    let unknown = signed(&client, server.url("/webhooks"), "products/update", "w-int-2", "{}")
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let bad = signed(&client, server.url("/webhooks"), "app/uninstalled", "w-int-3", "{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let server = GatewayTestServer::start(test_config("http://127.0.0.1:9/v1")).await;
    let huge = "x".repeat(70_000);

    let response = reqwest::Client::new()
        .post(server.url("/webhooks"))
        .header("X-Shopify-Hmac-Sha256", "irrelevant")
        .body(huge)
        .send()
        .await
        .expect("oversized request should complete");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
