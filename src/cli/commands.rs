use clap::{Parser, Subcommand};

/// `ama-storefront` - Ask Me Anything backend for Shopify storefronts.
#[derive(Parser, Debug)]
#[command(name = "ama-storefront")]
#[command(version)]
#[command(about = "Ask Me Anything storefront widget backend.", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: ~/.ama-storefront/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP backend (webhooks, app proxy, health)
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the base64 HMAC-SHA256 of a webhook body
    Sign {
        /// Shared secret (defaults to shopify.api_secret)
        #[arg(long)]
        secret: Option<String>,

        /// Body file; reads stdin when omitted
        #[arg(long)]
        file: Option<String>,
    },

    /// Register the configured webhook topics for one shop
    RegisterWebhooks {
        /// Shop domain, e.g. demo.myshopify.com
        #[arg(long)]
        shop: String,

        /// Offline Admin API access token (defaults to the stored session)
        #[arg(long)]
        access_token: Option<String>,
    },

    /// Validate configuration and print which settings are present
    Check,
}
