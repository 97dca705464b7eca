use crate::config::Config;
use anyhow::Result;
use std::str::FromStr;
use tracing::{Level, Subscriber};
use tracing_subscriber::FmtSubscriber;

/// Level named by `--log-level` or the config; unknown names fall back to INFO.
pub fn log_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// Load the config and apply env overrides with `subscriber` active, so
/// first-run and override warnings are not lost before logging is set up.
pub fn load_config_with<S>(path: Option<&str>, subscriber: S) -> Result<Config>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(subscriber, || -> Result<Config> {
        let mut config = Config::load_or_init(path)?;
        config.apply_env_overrides();
        Ok(config)
    })
}

/// [`load_config_with`] using a plain fmt subscriber at `level`.
pub fn load_config(path: Option<&str>, level: Level) -> Result<Config> {
    load_config_with(path, FmtSubscriber::builder().with_max_level(level).finish())
}

/// Install the process-wide subscriber.
pub fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
