use super::handlers::{
    handle_debug, handle_health, handle_index, handle_proxy_ask, handle_register_webhooks,
    handle_webhook,
};
use super::headers::security_headers;
use super::{AppState, LandingPage, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS, ReplayGuard};

use crate::config::Config;
use crate::proxy::{AskService, OpenAiCompatibleProvider, Provider};
use crate::shopify::{MemorySessionStore, SessionStore, WebhookRegistrar};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP backend using axum.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    // ── Security: refuse public bind without explicit opt-in ──
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the backend would be exposed directly.\n\
             Fix: use --host 127.0.0.1 (default) behind a tunnel, or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(host, listener, config).await
}

/// Assemble handler state from validated config.
///
/// `provider` and `sessions` are injected so tests and alternative stores can
/// replace the HTTP completion client and the in-memory session map.
pub fn build_state(
    config: Arc<Config>,
    provider: Arc<dyn Provider>,
    sessions: Arc<dyn SessionStore>,
) -> Result<AppState> {
    let ask = AskService::new(provider, &config.ai);
    let registrar = WebhookRegistrar::new(
        config.shopify.api_version.clone(),
        config.shopify.admin_api_base.clone(),
    );
    let landing = LandingPage::new().context("compile landing page template")?;

    Ok(AppState {
        webhook_secret: config.webhook_secret().map(Arc::new),
        ask,
        sessions,
        registrar: Arc::new(registrar),
        replay_guard: Arc::new(ReplayGuard::new()),
        landing: Arc::new(landing),
        config,
    })
}

fn default_state(config: Arc<Config>) -> Result<AppState> {
    let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatibleProvider::new(
        &config.ai.base_url,
        config.ai.api_key.as_deref(),
        config.ai.timeout_secs,
    ));
    let sessions: Arc<dyn SessionStore> = Arc::new(
        MemorySessionStore::from_seeds(&config.shopify.sessions)
            .context("seed session store from config")?,
    );
    build_state(config, provider, sessions)
}

/// Run the HTTP backend from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    config.validate().context("invalid configuration")?;

    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let state = default_state(Arc::clone(&config))?;
    print_gateway_banner(&display_addr, &config);
    tracing::info!(
        addr = %display_addr,
        environment = %config.environment,
        model = state.ask.model(),
        "gateway starting"
    );

    let app = build_app(state, &config.gateway.cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn print_gateway_banner(display_addr: &str, config: &Config) {
    println!("AMA backend listening on {display_addr}");
    println!("  GET  /");
    println!("  GET  /health");
    println!("  GET  /debug");
    println!("  POST /webhooks");
    println!("  POST /webhooks/register");
    println!("  POST /proxy/ask");
    println!("  Environment: {}", config.environment);
    if !config.shopify.verify_app_proxy {
        println!("  App proxy signature check disabled");
    }
}

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let mut app = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/debug", get(handle_debug))
        .route("/webhooks", post(handle_webhook))
        .route("/webhooks/register", post(handle_register_webhooks))
        .route("/proxy/ask", post(handle_proxy_ask))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app.layer(middleware::from_fn(security_headers))
}
