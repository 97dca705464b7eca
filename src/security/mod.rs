pub mod app_proxy;
pub mod redact;
pub mod signature;

pub use app_proxy::{compute_app_proxy_signature, verify_app_proxy_signature};
pub use redact::{redact_secret, sanitize_api_error, scrub_secret_patterns};
pub use signature::{
    SHOPIFY_HMAC_HEADER, SignatureCheck, WebhookSecret, check_webhook_hmac, compare_signatures,
    compute_webhook_hmac, verify_webhook_hmac,
};

/// Constant-time equality comparison for secret strings.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
