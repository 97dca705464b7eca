use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the storefront backend.
///
/// Library callers can match on these to decide recovery strategy; the
/// server and CLI continue to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum AmaError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Signatures ──────────────────────────────────────────────────────
    #[error("signature: {0}")]
    Signature(#[from] SignatureError),

    // ── Completion provider ─────────────────────────────────────────────
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    // ── Shopify platform ────────────────────────────────────────────────
    #[error("shopify: {0}")]
    Shopify(#[from] ShopifyError),

    // ── Widget ──────────────────────────────────────────────────────────
    #[error("widget: {0}")]
    Widget(#[from] WidgetError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("missing required value: {0}")]
    Missing(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Signature errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid hmac key: {0}")]
    InvalidKey(String),

    #[error("signature header missing")]
    MissingHeader,

    #[error("request body missing")]
    MissingBody,

    #[error("signature mismatch")]
    Mismatch,
}

// ─── Provider errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response contained no answer")]
    EmptyAnswer,
}

// ─── Shopify errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("invalid shop domain: {0}")]
    InvalidShopDomain(String),

    #[error("unknown webhook topic: {0}")]
    UnknownTopic(String),

    #[error("no session stored for {0}")]
    SessionNotFound(String),

    #[error("admin api request failed: {0}")]
    AdminApi(String),
}

// ─── Widget errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("network: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AmaError>;
