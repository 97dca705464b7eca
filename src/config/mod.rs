pub mod schema;

pub use schema::{
    AiConfig, Config, ConfigPresence, DebugConfig, Environment, GatewayConfig, SessionSeed,
    ShopifyConfig,
};
