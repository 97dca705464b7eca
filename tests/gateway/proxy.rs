use super::gateway_harness::{GatewayTestServer, SECRET, SHOP, test_config};
use ama_storefront::security::compute_app_proxy_signature;
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_query() -> Vec<(String, String)> {
    let mut params = vec![
        ("shop".to_string(), SHOP.to_string()),
        ("path_prefix".to_string(), "/apps/ama".to_string()),
        ("timestamp".to_string(), "1700000000".to_string()),
    ];
    let signature = compute_app_proxy_signature(SECRET.as_bytes(), &params)
        .expect("signature should compute");
    params.push(("signature".to_string(), signature));
    params
}

fn completion(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn question_is_answered_through_completion_endpoint() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-integration"))
        .and(body_string_contains("What material is this?"))
        .and(body_string_contains("Classic Tee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Cotton")))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(test_config(&format!("{}/v1", upstream.uri()))).await;
    let response = reqwest::Client::new()
        .post(server.url("/proxy/ask"))
        .query(&signed_query())
        .json(&json!({"question": "What material is this?", "productContext": "Classic Tee"}))
        .send()
        .await
        .expect("ask request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"answer": "Cotton"}));
}

#[tokio::test]
async fn forged_proxy_signature_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("nope")))
        .expect(0)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(test_config(&format!("{}/v1", upstream.uri()))).await;
    let mut query = signed_query();
    query[0].1 = "other.myshopify.com".to_string();

    let response = reqwest::Client::new()
        .post(server.url("/proxy/ask"))
        .query(&query)
        .json(&json!({"question": "Size?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway_without_leaking() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("internal error for key sk-integration"),
        )
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(test_config(&format!("{}/v1", upstream.uri()))).await;
    let response = reqwest::Client::new()
        .post(server.url("/proxy/ask"))
        .query(&signed_query())
        .json(&json!({"question": "Is it warm?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some());
    assert!(!body.to_string().contains("sk-integration"));
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(test_config(&format!("{}/v1", upstream.uri()))).await;

    let response = reqwest::Client::new()
        .post(server.url("/proxy/ask"))
        .query(&signed_query())
        .json(&json!({"question": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Question must not be empty");
}
