//! App proxy request signatures.
//!
//! Storefront requests forwarded through the Shopify app proxy carry a
//! `signature` query parameter: the hex HMAC-SHA256 of every other parameter
//! rendered as `key=value` (repeated keys joined with `,`), sorted and
//! concatenated without a separator.

use super::signature::{SignatureCheck, compare_signatures};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

pub const APP_PROXY_SIGNATURE_PARAM: &str = "signature";

fn canonical_message(pairs: &[(String, String)]) -> String {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in pairs {
        if key == APP_PROXY_SIGNATURE_PARAM {
            continue;
        }
        grouped.entry(key.as_str()).or_default().push(value.as_str());
    }

    let mut rendered: Vec<String> = grouped
        .into_iter()
        .map(|(key, values)| format!("{key}={}", values.join(",")))
        .collect();
    rendered.sort_unstable();
    rendered.concat()
}

/// Hex HMAC over the canonical form of `pairs`.
pub fn compute_app_proxy_signature(secret: &[u8], pairs: &[(String, String)]) -> Option<String> {
    if secret.is_empty() {
        return None;
    }
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(canonical_message(pairs).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify_app_proxy_signature(secret: &[u8], pairs: &[(String, String)]) -> bool {
    let Some(received) = pairs
        .iter()
        .find(|(key, _)| key == APP_PROXY_SIGNATURE_PARAM)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
    else {
        return false;
    };

    let Some(expected) = compute_app_proxy_signature(secret, pairs) else {
        return false;
    };

    compare_signatures(&expected, received) == SignatureCheck::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn canonical_message_sorts_and_joins_repeated_keys() {
        let input = pairs(&[
            ("shop", "demo.myshopify.com"),
            ("extra", "1"),
            ("extra", "2"),
            ("signature", "ignored"),
            ("path_prefix", "/apps/ama"),
        ]);
        assert_eq!(
            canonical_message(&input),
            "extra=1,2path_prefix=/apps/amashop=demo.myshopify.com"
        );
    }

    #[test]
    fn signed_query_verifies() {
        let mut input = pairs(&[
            ("shop", "demo.myshopify.com"),
            ("path_prefix", "/apps/ama"),
            ("timestamp", "1317327555"),
        ]);
        let sig = compute_app_proxy_signature(b"hush", &input).unwrap();
        input.push(("signature".into(), sig));
        assert!(verify_app_proxy_signature(b"hush", &input));
    }

    #[test]
    fn tampered_param_fails() {
        let mut input = pairs(&[("shop", "demo.myshopify.com"), ("timestamp", "1")]);
        let sig = compute_app_proxy_signature(b"hush", &input).unwrap();
        input.push(("signature".into(), sig));
        input[1].1 = "2".into();
        assert!(!verify_app_proxy_signature(b"hush", &input));
    }

    #[test]
    fn missing_signature_fails() {
        let input = pairs(&[("shop", "demo.myshopify.com")]);
        assert!(!verify_app_proxy_signature(b"hush", &input));
    }

    #[test]
    fn short_signature_fails() {
        let input = pairs(&[("shop", "demo.myshopify.com"), ("signature", "abcd")]);
        assert!(!verify_app_proxy_signature(b"hush", &input));
    }
}
