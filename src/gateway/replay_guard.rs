//! Duplicate-delivery protection for `/webhooks`.
//!
//! Shopify retries deliveries with the same `x-shopify-webhook-id`. Keys are
//! remembered for a TTL window, in memory only, so a restart forgets them.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_TTL_SECS: u64 = 600;
const MAX_ENTRIES: usize = 10_000;

pub struct ReplayGuard {
    seen: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Delivery key: the webhook id when Shopify sent one, otherwise a body hash.
    pub fn delivery_key(webhook_id: Option<&str>, body: &[u8]) -> String {
        match webhook_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => format!("id:{id}"),
            None => format!("body:{}", hex::encode(Sha256::digest(body))),
        }
    }

    /// Returns `true` if new (process), `false` if already seen within the TTL.
    pub fn check_and_record(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if seen.len() > MAX_ENTRIES {
            seen.retain(|_, ts| now.duration_since(*ts) < self.ttl);
        }
        if let Some(ts) = seen.get(key)
            && now.duration_since(*ts) < self.ttl
        {
            return false;
        }
        seen.insert(key.to_string(), now);
        true
    }

    /// Drop a recorded key so a retry of a failed delivery is processed again.
    pub fn forget(&self, key: &str) {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}

impl std::fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayGuard")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
