use super::{AiConfig, GatewayConfig, ShopifyConfig};
use crate::error::ConfigError;
use crate::security::{WebhookSecret, redact_secret};
use crate::shopify::ShopDomain;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Key accepted in `x-debug-key` to open `/debug` in production
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - resolved at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub shopify: ShopifyConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

fn default_log_level() -> String {
    "info".into()
}

/// Which settings are configured, without their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigPresence {
    pub shopify_api_key: bool,
    pub shopify_api_secret: bool,
    pub app_url: bool,
    pub ai_api_key: bool,
    pub debug_key: bool,
    pub sessions: usize,
}

fn is_set(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn default_config_dir() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".ama-storefront"))
}

impl Default for Config {
    fn default() -> Self {
        let config_path = default_config_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("config.toml");

        Self {
            config_path,
            environment: Environment::default(),
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
            shopify: ShopifyConfig::default(),
            ai: AiConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Config {
    /// Load `path` (with `~` expanded) or the default
    /// `~/.ama-storefront/config.toml`, writing defaults there on first run.
    pub fn load_or_init(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => default_config_dir()?.join("config.toml"),
        };
        if config_path.exists() {
            return Self::load_from_path(&config_path);
        }

        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }
        let config = Self {
            config_path,
            ..Self::default()
        };
        config.save()?;
        tracing::info!(path = %config.config_path.display(), "wrote default config");
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; `apply_env_overrides` passes the
    /// process environment.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("SHOPIFY_API_KEY") {
            self.shopify.api_key = Some(key);
        }
        if let Some(secret) = non_empty("SHOPIFY_API_SECRET") {
            self.shopify.api_secret = Some(secret);
        }
        if let Some(url) = non_empty("SHOPIFY_APP_URL") {
            self.shopify.app_url = Some(url);
        }
        if let Some(scopes) = non_empty("SCOPES") {
            self.shopify.scopes = scopes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(base_url) = non_empty("AMA_AI_BASE_URL") {
            self.ai.base_url = base_url;
        }
        if let Some(model) = non_empty("AMA_MODEL") {
            self.ai.model = model;
        }
        if let Some(key) = non_empty("DEBUG_KEY") {
            self.debug.key = Some(key);
        }
        if let Some(env) = non_empty("AMA_ENV").or_else(|| non_empty("NODE_ENV")) {
            match env.trim().parse::<Environment>() {
                Ok(parsed) => self.environment = parsed,
                Err(_) => tracing::warn!(value = %env, "ignoring unknown environment"),
            }
        }
        if let Some(port) = non_empty("AMA_GATEWAY_PORT").or_else(|| non_empty("PORT")) {
            if let Ok(port) = port.trim().parse::<u16>() {
                self.gateway.port = port;
            }
        }
        if let Some(host) = non_empty("AMA_GATEWAY_HOST").or_else(|| non_empty("HOST")) {
            self.gateway.host = host;
        }
    }

    /// Fail fast on anything the server cannot run without.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !is_set(self.shopify.api_secret.as_ref()) {
            return Err(ConfigError::Missing("shopify.api_secret"));
        }

        let Some(app_url) = self.shopify.app_url.as_deref().map(str::trim) else {
            return Err(ConfigError::Missing("shopify.app_url"));
        };
        url::Url::parse(app_url)
            .map_err(|e| ConfigError::Validation(format!("shopify.app_url: {e}")))?;

        if self.shopify.api_version.trim().is_empty() {
            return Err(ConfigError::Missing("shopify.api_version"));
        }

        for seed in &self.shopify.sessions {
            ShopDomain::parse(&seed.shop)
                .map_err(|e| ConfigError::Validation(format!("shopify.sessions: {e}")))?;
        }

        url::Url::parse(&self.ai.base_url)
            .map_err(|e| ConfigError::Validation(format!("ai.base_url: {e}")))?;

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::Validation(format!(
                "ai.temperature must be within 0.0..=2.0 (got {})",
                self.ai.temperature
            )));
        }

        if self.ai.max_question_chars == 0 {
            return Err(ConfigError::Validation(
                "ai.max_question_chars must be positive".into(),
            ));
        }

        if self.environment.is_production() && !is_set(self.ai.api_key.as_ref()) {
            return Err(ConfigError::Missing("ai.api_key"));
        }

        Ok(())
    }

    pub fn webhook_secret(&self) -> Option<WebhookSecret> {
        self.shopify
            .api_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(WebhookSecret::from)
    }

    pub fn presence(&self) -> ConfigPresence {
        ConfigPresence {
            shopify_api_key: is_set(self.shopify.api_key.as_ref()),
            shopify_api_secret: is_set(self.shopify.api_secret.as_ref()),
            app_url: is_set(self.shopify.app_url.as_ref()),
            ai_api_key: is_set(self.ai.api_key.as_ref()),
            debug_key: is_set(self.debug.key.as_ref()),
            sessions: self.shopify.sessions.len(),
        }
    }

    /// Configuration view safe to echo back over HTTP.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "environment": self.environment.to_string(),
            "gateway": {
                "host": self.gateway.host,
                "port": self.gateway.port,
                "allow_public_bind": self.gateway.allow_public_bind,
            },
            "shopify": {
                "api_key": redact_secret(self.shopify.api_key.as_deref()),
                "api_secret": redact_secret(self.shopify.api_secret.as_deref()),
                "app_url": self.shopify.app_url.as_deref().unwrap_or("<unset>"),
                "scopes": self.shopify.scopes,
                "api_version": self.shopify.api_version,
                "webhook_topics": self
                    .shopify
                    .webhook_topics
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
                "verify_app_proxy": self.shopify.verify_app_proxy,
                "sessions": self.shopify.sessions.len(),
            },
            "ai": {
                "base_url": self.ai.base_url,
                "api_key": redact_secret(self.ai.api_key.as_deref()),
                "model": self.ai.model,
                "timeout_secs": self.ai.timeout_secs,
            },
            "debug": {
                "key": redact_secret(self.debug.key.as_deref()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.shopify.api_secret = Some("shpss_test_secret".into());
        config.shopify.app_url = Some("https://ama.example.com".into());
        config
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn missing_secret_fails_fast() {
        let mut config = valid_config();
        config.shopify.api_secret = Some("   ".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("shopify.api_secret"))
        ));
    }

    #[test]
    fn missing_app_url_fails_fast() {
        let mut config = valid_config();
        config.shopify.app_url = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("shopify.app_url"))
        ));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        let mut config = valid_config();
        config.shopify.app_url = Some("not a url".into());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = valid_config();
        config.ai.base_url = "::".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let mut config = valid_config();
        config.ai.temperature = 2.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn production_requires_ai_key() {
        let mut config = valid_config();
        config.environment = Environment::Production;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("ai.api_key"))
        ));
        config.ai.api_key = Some("sk-test".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_session_shop_is_rejected() {
        let mut config = valid_config();
        config.shopify.sessions.push(crate::config::SessionSeed {
            shop: "evil.example.com".into(),
            access_token: "shpat_x".into(),
            scope: None,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn overrides_apply_and_fall_back() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[
            ("SHOPIFY_API_SECRET", "shpss_env"),
            ("SHOPIFY_APP_URL", "https://env.example.com"),
            ("SCOPES", "read_products, read_content,,"),
            ("OPENAI_API_KEY", "sk-env"),
            ("NODE_ENV", "Production"),
            ("PORT", "8081"),
            ("HOST", "0.0.0.0"),
        ]));

        assert_eq!(config.shopify.api_secret.as_deref(), Some("shpss_env"));
        assert_eq!(
            config.shopify.app_url.as_deref(),
            Some("https://env.example.com")
        );
        assert_eq!(config.shopify.scopes, vec!["read_products", "read_content"]);
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.gateway.port, 8081);
        assert_eq!(config.gateway.host, "0.0.0.0");
    }

    #[test]
    fn prefixed_overrides_win_over_generic_ones() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[
            ("AMA_ENV", "test"),
            ("NODE_ENV", "production"),
            ("AMA_GATEWAY_PORT", "9000"),
            ("PORT", "8081"),
        ]));
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.gateway.port, 9000);
    }

    #[test]
    fn empty_and_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[
            ("SHOPIFY_API_SECRET", ""),
            ("PORT", "not-a-port"),
            ("AMA_ENV", "staging"),
        ]));
        assert!(config.shopify.api_secret.is_none());
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn presence_never_exposes_values() {
        let mut config = valid_config();
        config.ai.api_key = Some("sk-live-key".into());
        let presence = config.presence();
        assert!(presence.shopify_api_secret);
        assert!(presence.ai_api_key);
        assert!(!presence.shopify_api_key);

        let rendered = serde_json::to_string(&config.redacted_summary()).unwrap();
        assert!(!rendered.contains("shpss_test_secret"));
        assert!(!rendered.contains("sk-live-key"));
    }

    #[test]
    fn load_from_path_reads_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
environment = "test"

[shopify]
api_secret = "shpss_file"
app_url = "https://file.example.com"

[gateway]
port = 4100
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.gateway.port, 4100);
        assert_eq!(config.config_path, path);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_path_reports_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "environment = [").unwrap();
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn missing_explicit_path_is_initialised_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config::load_or_init(path.to_str()).unwrap();
        assert_eq!(config.config_path, path);
        assert!(path.exists());
        assert_eq!(Config::load_or_init(path.to_str()).unwrap().gateway.port, 3000);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut config = valid_config();
        config.config_path = tmp.path().join("config.toml");
        config.gateway.port = 4321;
        config.save().unwrap();

        let loaded = Config::load_from_path(&config.config_path).unwrap();
        assert_eq!(loaded.gateway.port, 4321);
        assert_eq!(
            loaded.shopify.api_secret.as_deref(),
            Some("shpss_test_secret")
        );
    }
}
