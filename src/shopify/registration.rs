use super::{ACCESS_TOKEN_HEADER, ShopDomain, WebhookTopic};
use crate::error::ShopifyError;
use crate::security::sanitize_api_error;
use serde::{Deserialize, Serialize};
use serde_json::json;

const CREATE_SUBSCRIPTION_MUTATION: &str = "\
mutation webhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription { id }
    userErrors { field message }
  }
}";

/// Result of registering one topic for one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub topic: WebhookTopic,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<GraphqlData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlData {
    webhook_subscription_create: Option<CreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePayload {
    webhook_subscription: Option<Subscription>,
    #[serde(default)]
    user_errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Registers webhook subscriptions through the Admin GraphQL API.
pub struct WebhookRegistrar {
    client: reqwest::Client,
    api_version: String,
    admin_api_base: Option<String>,
}

impl WebhookRegistrar {
    pub fn new(api_version: impl Into<String>, admin_api_base: Option<String>) -> Self {
        Self {
            client: crate::proxy::http_client::build_http_client_with_timeout(20),
            api_version: api_version.into(),
            admin_api_base,
        }
    }

    fn endpoint(&self, shop: &ShopDomain) -> String {
        let base = self
            .admin_api_base
            .as_deref()
            .map_or_else(|| shop.origin(), |b| b.trim_end_matches('/').to_string());
        format!("{base}/admin/api/{}/graphql.json", self.api_version)
    }

    /// Register each topic, delivering to `callback_url`.
    ///
    /// Compliance topics are reported as failures without a request: they
    /// are configured on the app, not per shop. A transport or HTTP failure
    /// aborts the whole run.
    pub async fn register(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        topics: &[WebhookTopic],
        callback_url: &str,
    ) -> Result<Vec<RegistrationOutcome>, ShopifyError> {
        let mut outcomes = Vec::with_capacity(topics.len());
        for &topic in topics {
            if topic.is_compliance() {
                outcomes.push(RegistrationOutcome {
                    topic,
                    success: false,
                    subscription_id: None,
                    errors: vec!["compliance topics are configured in the app settings".into()],
                });
                continue;
            }

            let outcome = self
                .register_one(shop, access_token, topic, callback_url)
                .await?;
            if outcome.success {
                tracing::info!(%shop, %topic, "webhook registered");
            } else {
                tracing::warn!(%shop, %topic, errors = ?outcome.errors, "webhook registration rejected");
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn register_one(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        topic: WebhookTopic,
        callback_url: &str,
    ) -> Result<RegistrationOutcome, ShopifyError> {
        let body = json!({
            "query": CREATE_SUBSCRIPTION_MUTATION,
            "variables": {
                "topic": topic.graphql_name(),
                "webhookSubscription": {
                    "callbackUrl": callback_url,
                    "format": "JSON",
                },
            },
        });

        let response = self
            .client
            .post(self.endpoint(shop))
            .header(ACCESS_TOKEN_HEADER, access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopifyError::AdminApi(sanitize_api_error(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::AdminApi(format!(
                "{status}: {}",
                sanitize_api_error(&text)
            )));
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| ShopifyError::AdminApi(format!("invalid response: {e}")))?;

        let mut errors: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
        let payload = parsed.data.and_then(|d| d.webhook_subscription_create);
        let subscription_id = payload.as_ref().and_then(|p| {
            p.webhook_subscription
                .as_ref()
                .map(|subscription| subscription.id.clone())
        });
        if let Some(payload) = payload {
            errors.extend(payload.user_errors.into_iter().map(|e| e.message));
        }

        Ok(RegistrationOutcome {
            topic,
            success: subscription_id.is_some() && errors.is_empty(),
            subscription_id,
            errors,
        })
    }
}
