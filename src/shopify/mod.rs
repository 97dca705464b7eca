//! Shopify platform glue: shop domains, webhook topics, offline sessions and
//! webhook registration through the Admin GraphQL API.

pub mod domain;
pub mod registration;
pub mod session;
pub mod topics;

pub use domain::ShopDomain;
pub use registration::{RegistrationOutcome, WebhookRegistrar};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use topics::WebhookTopic;

pub const TOPIC_HEADER: &str = "x-shopify-topic";
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";
pub const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
