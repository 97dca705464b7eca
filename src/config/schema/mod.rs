mod ai;
mod core;
mod gateway;
mod shopify;

pub use ai::AiConfig;
pub use core::{Config, ConfigPresence, DebugConfig, Environment};
pub use gateway::GatewayConfig;
pub use shopify::{SessionSeed, ShopifyConfig};
