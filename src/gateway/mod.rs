//! Axum-based HTTP backend for the embedded app.
//!
//! - Request body size limit (64KB max)
//! - Request timeout (30s) to prevent slow-loris attacks
//! - Framing and `nosniff` headers on every response
//! - Webhook bodies are verified against `x-shopify-hmac-sha256` before parsing

mod handlers;
pub mod headers;
mod landing;
mod replay_guard;
mod server;

pub use landing::LandingPage;
pub use replay_guard::ReplayGuard;
pub use server::{build_app, build_state, run_gateway, run_gateway_with_listener};

use crate::config::Config;
use crate::proxy::AskService;
use crate::security::WebhookSecret;
use crate::shopify::{SessionStore, WebhookRegistrar};
use std::sync::Arc;

/// Maximum request body size (64KB) -- prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) -- prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Header that opens `/debug` and `/webhooks/register` in production
pub const DEBUG_KEY_HEADER: &str = "x-debug-key";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub webhook_secret: Option<Arc<WebhookSecret>>,
    pub ask: AskService,
    pub sessions: Arc<dyn SessionStore>,
    pub registrar: Arc<WebhookRegistrar>,
    pub replay_guard: Arc<ReplayGuard>,
    pub landing: Arc<LandingPage>,
}

/// `POST /webhooks/register` request body
#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct RegisterWebhooksBody {
    pub shop: String,
}

/// `GET /` query parameters sent by the Shopify admin
#[derive(Debug, Default, serde::Deserialize)]
pub struct LandingQuery {
    pub shop: Option<String>,
    pub host: Option<String>,
}
