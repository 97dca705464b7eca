use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::gateway::run_gateway;
use crate::security::{WebhookSecret, compute_webhook_hmac};
use crate::shopify::{MemorySessionStore, SessionStore, ShopDomain, WebhookRegistrar};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => run_serve(config, host, port).await,
        Commands::Sign { secret, file } => run_sign(&config, secret, file.as_deref()).await,
        Commands::RegisterWebhooks { shop, access_token } => {
            run_register(&config, &shop, access_token).await
        }
        Commands::Check => run_check(&config),
    }
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    info!(%host, port, "starting backend");
    run_gateway(&host, port, Arc::new(config)).await
}

/// Base64 HMAC of `body`, the value Shopify sends in `x-shopify-hmac-sha256`.
pub fn sign_body(secret: &WebhookSecret, body: &[u8]) -> Result<String> {
    Ok(compute_webhook_hmac(secret.as_bytes(), body)?)
}

async fn run_sign(config: &Config, secret: Option<String>, file: Option<&str>) -> Result<()> {
    let secret = match secret.filter(|s| !s.trim().is_empty()) {
        Some(raw) => WebhookSecret::from(raw.as_str()),
        None => config
            .webhook_secret()
            .context("no secret given and shopify.api_secret is not configured")?,
    };

    let body = match file {
        Some(path) => {
            let expanded = shellexpand::tilde(path).into_owned();
            tokio::fs::read(&expanded)
                .await
                .with_context(|| format!("read body file {expanded}"))?
        }
        None => read_body(tokio::io::stdin()).await?,
    };

    println!("{}", sign_body(&secret, &body)?);
    Ok(())
}

async fn read_body(mut reader: impl AsyncRead + Unpin) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .context("read body from stdin")?;
    Ok(buf)
}

async fn run_register(config: &Config, shop: &str, access_token: Option<String>) -> Result<()> {
    let shop = ShopDomain::parse(shop)?;
    let access_token = match access_token.filter(|t| !t.trim().is_empty()) {
        Some(token) => token,
        None => {
            let store = MemorySessionStore::from_seeds(&config.shopify.sessions)?;
            store
                .find_by_shop(&shop)
                .await?
                .map(|session| session.access_token)
                .with_context(|| format!("no --access-token given and no session for {shop}"))?
        }
    };

    let Some(app_url) = config.shopify.app_url.as_deref() else {
        bail!("shopify.app_url must be set to build the webhook callback URL");
    };
    let callback_url = format!("{}/webhooks", app_url.trim_end_matches('/'));

    let registrar = WebhookRegistrar::new(
        config.shopify.api_version.clone(),
        config.shopify.admin_api_base.clone(),
    );
    let outcomes = registrar
        .register(
            &shop,
            &access_token,
            &config.shopify.webhook_topics,
            &callback_url,
        )
        .await?;

    for outcome in &outcomes {
        if outcome.success {
            println!("  ok    {}", outcome.topic);
        } else {
            println!("  fail  {}: {}", outcome.topic, outcome.errors.join("; "));
        }
    }
    if outcomes.iter().any(|o| !o.success) {
        bail!("some webhook topics failed to register");
    }
    Ok(())
}

fn run_check(config: &Config) -> Result<()> {
    println!("Config: {}", config.config_path.display());
    println!("{}", serde_json::to_string_pretty(&config.presence())?);
    config.validate().context("configuration is invalid")?;
    println!("Configuration OK ({})", config.environment);
    Ok(())
}
