use anyhow::Result;
use ama_storefront::app::dispatch::dispatch;
use ama_storefront::app::startup::{init_logging, load_config, log_level};
use ama_storefront::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    // This prevents the error: "could not automatically determine the process-level CryptoProvider"
    // when both aws-lc-rs and ring features are available (or neither is explicitly selected).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let provisional = log_level(cli.log_level.as_deref().unwrap_or("info"));
    let config = load_config(cli.config.as_deref(), provisional)?;

    // Initialize logging
    let level_name = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(log_level(level_name))?;

    dispatch(cli, config).await
}
