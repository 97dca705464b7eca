//! Shopify webhook signature verification (`X-Shopify-Hmac-Sha256`).
//!
//! Shopify signs the raw request body with the app's shared secret and sends
//! the base64-encoded HMAC-SHA256 digest in a header. The caller must hand in
//! the exact bytes it received, before any JSON parsing.

use crate::error::SignatureError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 webhook signature.
pub const SHOPIFY_HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Process-wide shared secret. Never logged, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for WebhookSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}

/// Outcome of comparing two encoded signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Mismatch,
    /// Lengths differ; the constant-time comparator was not run.
    LengthMismatch,
}

/// Base64 (standard, padded) HMAC-SHA256 of `body` keyed by `secret`.
pub fn compute_webhook_hmac(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::InvalidKey("empty secret".into()));
    }
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Compare an expected signature against a received one.
///
/// Equal-length inputs are compared with `subtle`, so the running time does
/// not depend on where the first differing byte sits.
pub fn compare_signatures(expected: &str, received: &str) -> SignatureCheck {
    let expected = expected.as_bytes();
    let received = received.as_bytes();
    if expected.len() != received.len() {
        return SignatureCheck::LengthMismatch;
    }
    if bool::from(expected.ct_eq(received)) {
        SignatureCheck::Valid
    } else {
        SignatureCheck::Mismatch
    }
}

/// Verify a webhook, returning the reason on rejection.
pub fn check_webhook_hmac(
    secret: &[u8],
    body: Option<&[u8]>,
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::MissingHeader)?;
    let body = body.ok_or(SignatureError::MissingBody)?;

    let computed = compute_webhook_hmac(secret, body)?;
    match compare_signatures(&computed, signature) {
        SignatureCheck::Valid => Ok(()),
        SignatureCheck::Mismatch | SignatureCheck::LengthMismatch => {
            Err(SignatureError::Mismatch)
        }
    }
}

/// Accept/reject decision for an inbound webhook.
///
/// `body` is `None` when the request carried no body at all, which is
/// rejected; `Some(b"")` is a valid empty body. Every internal fault maps to
/// `false`.
pub fn verify_webhook_hmac(secret: &[u8], body: Option<&[u8]>, signature: Option<&str>) -> bool {
    match check_webhook_hmac(secret, body, signature) {
        Ok(()) => true,
        Err(error) => {
            tracing::debug!(%error, "webhook signature rejected");
            false
        }
    }
}
