use crate::error::ShopifyError;
use serde::{Deserialize, Serialize};
use std::fmt;

const SHOP_SUFFIX: &str = ".myshopify.com";

/// A validated `{name}.myshopify.com` domain, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    pub fn parse(raw: &str) -> Result<Self, ShopifyError> {
        let candidate = raw.trim().to_ascii_lowercase();
        let candidate = candidate
            .strip_prefix("https://")
            .unwrap_or(&candidate)
            .trim_end_matches('/');

        let valid = candidate.strip_suffix(SHOP_SUFFIX).is_some_and(|name| {
            !name.is_empty()
                && !name.starts_with('-')
                && name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        });

        if valid {
            Ok(Self(candidate.to_string()))
        } else {
            Err(ShopifyError::InvalidShopDomain(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Origin used in `frame-ancestors` and Admin API URLs.
    pub fn origin(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(value: ShopDomain) -> Self {
        value.0
    }
}
