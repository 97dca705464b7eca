use serde::{Deserialize, Serialize};

/// Webhook topics this app subscribes to or must answer.
///
/// The three compliance topics are mandatory for public apps and are
/// configured in the Partner dashboard rather than registered per shop.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum WebhookTopic {
    #[serde(rename = "app/uninstalled")]
    #[strum(serialize = "app/uninstalled")]
    AppUninstalled,
    #[serde(rename = "app/scopes_update")]
    #[strum(serialize = "app/scopes_update")]
    AppScopesUpdate,
    #[serde(rename = "customers/data_request")]
    #[strum(serialize = "customers/data_request")]
    CustomersDataRequest,
    #[serde(rename = "customers/redact")]
    #[strum(serialize = "customers/redact")]
    CustomersRedact,
    #[serde(rename = "shop/redact")]
    #[strum(serialize = "shop/redact")]
    ShopRedact,
}

impl WebhookTopic {
    /// `WebhookSubscriptionTopic` enum value in the Admin GraphQL API.
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::AppUninstalled => "APP_UNINSTALLED",
            Self::AppScopesUpdate => "APP_SCOPES_UPDATE",
            Self::CustomersDataRequest => "CUSTOMERS_DATA_REQUEST",
            Self::CustomersRedact => "CUSTOMERS_REDACT",
            Self::ShopRedact => "SHOP_REDACT",
        }
    }

    pub fn is_compliance(self) -> bool {
        matches!(
            self,
            Self::CustomersDataRequest | Self::CustomersRedact | Self::ShopRedact
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn header_values_parse() {
        assert_eq!(
            WebhookTopic::from_str("app/uninstalled").unwrap(),
            WebhookTopic::AppUninstalled
        );
        assert_eq!(
            WebhookTopic::from_str("customers/data_request").unwrap(),
            WebhookTopic::CustomersDataRequest
        );
        assert!(WebhookTopic::from_str("orders/create").is_err());
    }

    #[test]
    fn display_matches_header_value() {
        assert_eq!(WebhookTopic::ShopRedact.to_string(), "shop/redact");
        assert_eq!(
            WebhookTopic::AppScopesUpdate.to_string(),
            "app/scopes_update"
        );
    }

    #[test]
    fn graphql_names() {
        assert_eq!(
            WebhookTopic::AppUninstalled.graphql_name(),
            "APP_UNINSTALLED"
        );
        assert!(WebhookTopic::CustomersRedact.is_compliance());
        assert!(!WebhookTopic::AppUninstalled.is_compliance());
    }
}
