use super::{AppState, DEBUG_KEY_HEADER, LandingQuery, RegisterWebhooksBody, ReplayGuard};
use crate::proxy::{AskError, AskRequest, AskResponse, ErrorResponse};
use crate::security::redact::is_sensitive_header;
use crate::security::{
    SHOPIFY_HMAC_HEADER, constant_time_eq, sanitize_api_error, verify_app_proxy_signature,
    verify_webhook_hmac,
};
use crate::shopify::{
    SHOP_DOMAIN_HEADER, ShopDomain, TOPIC_HEADER, WEBHOOK_ID_HEADER, WebhookTopic,
};
use axum::{
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use std::str::FromStr;

type JsonReply = (StatusCode, Json<Value>);

fn error_reply(status: StatusCode, message: impl Into<String>) -> JsonReply {
    (status, Json(json!({"error": message.into()})))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Debug surfaces are open outside production; in production they need
/// `x-debug-key` to match the configured key.
fn debug_allowed(state: &AppState, headers: &HeaderMap) -> bool {
    if !state.config.environment.is_production() {
        return true;
    }
    let expected = state
        .config
        .debug
        .key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    match (expected, header_str(headers, DEBUG_KEY_HEADER)) {
        (Some(expected), Some(given)) => constant_time_eq(given, expected),
        _ => false,
    }
}

fn forbidden_reply() -> JsonReply {
    error_reply(StatusCode::FORBIDDEN, "Forbidden")
}

/// GET /health: always public (presence flags only, no secrets)
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment.to_string(),
        "version": env!("CARGO_PKG_VERSION"),
        "config": state.config.presence(),
    });
    Json(body)
}

fn redacted_headers(headers: &HeaderMap) -> serde_json::Map<String, Value> {
    let mut out = serde_json::Map::new();
    for (name, value) in headers {
        let rendered = if is_sensitive_header(name.as_str()) {
            "[REDACTED]".to_string()
        } else {
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        };
        out.insert(name.as_str().to_string(), Value::String(rendered));
    }
    out
}

/// GET /debug: request echo plus redacted config
pub(super) async fn handle_debug(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !debug_allowed(&state, &headers) {
        tracing::warn!(path = uri.path(), "debug endpoint refused");
        return forbidden_reply();
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());
    let sessions = state.sessions.count().await.ok();

    tracing::debug!(%request_id, "debug snapshot served");
    let body = json!({
        "request_id": request_id,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "request": {
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "headers": redacted_headers(&headers),
        },
        "server": {
            "hostname": host,
            "version": env!("CARGO_PKG_VERSION"),
            "pid": std::process::id(),
        },
        "config": state.config.redacted_summary(),
        "presence": state.config.presence(),
        "sessions": sessions,
    });
    (StatusCode::OK, Json(body))
}

/// Shop named by the webhook header, falling back to the payload.
fn webhook_shop(headers: &HeaderMap, payload: &Value) -> Option<ShopDomain> {
    header_str(headers, SHOP_DOMAIN_HEADER)
        .or_else(|| payload.get("myshopify_domain").and_then(Value::as_str))
        .and_then(|raw| ShopDomain::parse(raw).ok())
}

fn granted_scopes(payload: &Value) -> Option<String> {
    match payload.get("current")? {
        Value::Array(scopes) => Some(
            scopes
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::String(scopes) => Some(scopes.clone()),
        _ => None,
    }
}

async fn dispatch_webhook(
    state: &AppState,
    topic: WebhookTopic,
    shop: Option<ShopDomain>,
    payload: &Value,
) -> JsonReply {
    match topic {
        WebhookTopic::AppUninstalled => {
            let Some(shop) = shop else {
                return error_reply(StatusCode::BAD_REQUEST, "Missing shop domain");
            };
            match state.sessions.delete_by_shop(&shop).await {
                Ok(removed) => {
                    tracing::info!(%shop, removed, "app uninstalled; sessions removed");
                    (
                        StatusCode::OK,
                        Json(json!({"status": "ok", "sessions_removed": removed})),
                    )
                }
                Err(e) => {
                    tracing::error!(%shop, error = %e, "failed to remove sessions");
                    error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Session store error")
                }
            }
        }
        WebhookTopic::AppScopesUpdate => {
            let Some(shop) = shop else {
                return error_reply(StatusCode::BAD_REQUEST, "Missing shop domain");
            };
            let Some(scope) = granted_scopes(payload) else {
                return error_reply(StatusCode::BAD_REQUEST, "Missing current scopes");
            };
            match state.sessions.update_scope(&shop, &scope).await {
                Ok(updated) => {
                    if updated {
                        tracing::info!(%shop, %scope, "session scopes updated");
                    } else {
                        tracing::warn!(%shop, "scopes update for shop without a session");
                    }
                    (
                        StatusCode::OK,
                        Json(json!({"status": "ok", "updated": updated})),
                    )
                }
                Err(e) => {
                    tracing::error!(%shop, error = %e, "failed to update scopes");
                    error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Session store error")
                }
            }
        }
        WebhookTopic::CustomersDataRequest
        | WebhookTopic::CustomersRedact
        | WebhookTopic::ShopRedact => {
            // No customer data is stored; acknowledging is the whole obligation.
            tracing::info!(%topic, shop = ?shop.as_ref().map(ShopDomain::as_str), "compliance webhook acknowledged");
            (StatusCode::OK, Json(json!({"status": "ok"})))
        }
    }
}

/// POST /webhooks: Shopify webhook delivery
pub(super) async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // ── Verify before touching the payload ──
    let signature = header_str(&headers, SHOPIFY_HMAC_HEADER);
    let verified = state
        .webhook_secret
        .as_deref()
        .is_some_and(|secret| verify_webhook_hmac(secret.as_bytes(), Some(&body[..]), signature));
    if !verified {
        tracing::warn!(
            signature = if signature.is_some() { "invalid" } else { "missing" },
            "webhook signature verification failed"
        );
        return error_reply(StatusCode::UNAUTHORIZED, "Invalid webhook signature");
    }

    let Ok(payload) = serde_json::from_slice::<Value>(&body) else {
        return error_reply(StatusCode::BAD_REQUEST, "Invalid JSON payload");
    };

    let Some(raw_topic) = header_str(&headers, TOPIC_HEADER) else {
        return error_reply(StatusCode::BAD_REQUEST, "Missing webhook topic");
    };
    let Ok(topic) = WebhookTopic::from_str(raw_topic) else {
        tracing::warn!(topic = raw_topic, "unhandled webhook topic");
        return error_reply(
            StatusCode::NOT_FOUND,
            format!("Unhandled webhook topic: {raw_topic}"),
        );
    };

    let key = ReplayGuard::delivery_key(header_str(&headers, WEBHOOK_ID_HEADER), &body);
    if !state.replay_guard.check_and_record(&key) {
        tracing::info!(%topic, "duplicate webhook delivery ignored");
        return (StatusCode::OK, Json(json!({"status": "duplicate"})));
    }

    let shop = webhook_shop(&headers, &payload);
    let (status, reply) = dispatch_webhook(&state, topic, shop, &payload).await;
    if !status.is_success() {
        // Shopify retries failed deliveries with the same id.
        state.replay_guard.forget(&key);
    }
    (status, reply)
}

/// POST /webhooks/register: subscribe a stored shop to the configured topics
pub(super) async fn handle_register_webhooks(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RegisterWebhooksBody>, JsonRejection>,
) -> impl IntoResponse {
    if !debug_allowed(&state, &headers) {
        return forbidden_reply();
    }

    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => {
            return error_reply(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {e}. Expected: {{\"shop\": \"...\"}}"),
            );
        }
    };

    let shop = match ShopDomain::parse(&body.shop) {
        Ok(shop) => shop,
        Err(e) => return error_reply(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let session = match state.sessions.find_by_shop(&shop).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return error_reply(StatusCode::NOT_FOUND, format!("No session for {shop}"));
        }
        Err(e) => {
            tracing::error!(%shop, error = %e, "session lookup failed");
            return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Session store error");
        }
    };

    let Some(app_url) = state.config.shopify.app_url.as_deref() else {
        return error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "shopify.app_url is not configured",
        );
    };
    let callback_url = format!("{}/webhooks", app_url.trim_end_matches('/'));

    match state
        .registrar
        .register(
            &shop,
            &session.access_token,
            &state.config.shopify.webhook_topics,
            &callback_url,
        )
        .await
    {
        Ok(results) => (
            StatusCode::OK,
            Json(json!({"shop": shop.as_str(), "callback_url": callback_url, "results": results})),
        ),
        Err(e) => {
            let detail = sanitize_api_error(&e.to_string());
            tracing::error!(%shop, error = %detail, "webhook registration failed");
            error_reply(StatusCode::BAD_GATEWAY, detail)
        }
    }
}

fn ask_error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

/// POST /proxy/ask: app proxy target for widget questions
pub(super) async fn handle_proxy_ask(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => {
            return ask_error_reply(StatusCode::BAD_REQUEST, format!("Invalid query string: {e}"));
        }
    };

    if state.config.shopify.verify_app_proxy {
        let verified = state
            .webhook_secret
            .as_deref()
            .is_some_and(|secret| verify_app_proxy_signature(secret.as_bytes(), &params));
        if !verified {
            tracing::warn!("app proxy signature verification failed");
            return ask_error_reply(StatusCode::UNAUTHORIZED, "Invalid app proxy signature");
        }
    }

    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => {
            return ask_error_reply(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {e}. Expected: {{\"question\": \"...\"}}"),
            );
        }
    };

    let shop = params
        .iter()
        .find(|(k, _)| k == "shop")
        .map_or("unknown", |(_, v)| v.as_str());

    match state.ask.answer(&request).await {
        Ok(answer) => {
            tracing::info!(shop, model = state.ask.model(), "question answered");
            Json(AskResponse { answer }).into_response()
        }
        Err(e @ AskError::BlankQuestion) => {
            ask_error_reply(StatusCode::BAD_REQUEST, e.public_message())
        }
        Err(e @ AskError::Provider(_)) => {
            ask_error_reply(StatusCode::BAD_GATEWAY, e.public_message())
        }
    }
}

/// GET /: embedded admin landing page
pub(super) async fn handle_index(
    State(state): State<AppState>,
    Query(query): Query<LandingQuery>,
) -> Response {
    let shop = query
        .shop
        .as_deref()
        .and_then(|raw| ShopDomain::parse(raw).ok());
    if query.shop.is_some() && shop.is_none() {
        tracing::debug!("landing page requested with an invalid shop parameter");
    }

    match state.landing.render(&state.config, shop.as_ref()) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "landing page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
