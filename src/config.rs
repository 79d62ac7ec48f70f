use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Shared secret required on the trigger endpoints when set.
    #[serde(default)]
    pub event_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

/// Collection IDs in the document store
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub profiles: String,
    pub likes: String,
    pub blocks: String,
    pub matches: String,
}

/// Feed pagination knobs
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_feed_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    /// Ceiling on the raw candidates fetched per scan round.
    #[serde(default = "default_batch_cap")]
    pub batch_cap: u16,
    /// Extra scan rounds allowed when filtering leaves a page short.
    #[serde(default = "default_refill_rounds")]
    pub refill_rounds: u8,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            default_limit: default_feed_limit(),
            max_limit: default_max_limit(),
            batch_cap: default_batch_cap(),
            refill_rounds: default_refill_rounds(),
        }
    }
}

fn default_feed_limit() -> u16 { 25 }
fn default_max_limit() -> u16 { 50 }
fn default_batch_cap() -> u16 { 150 }
fn default_refill_rounds() -> u8 { 2 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with HAVEN_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with HAVEN_)
            // e.g., HAVEN_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("HAVEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("HAVEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Substitute secrets from the environment so the config files never carry
/// them. HAVEN_STORE__API_KEY and HAVEN_AUTH__JWT_SECRET take precedence
/// over anything in the files.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let store_api_key = env::var("HAVEN_STORE__API_KEY").ok();
    let store_endpoint = env::var("HAVEN_STORE__ENDPOINT").ok();
    let jwt_secret = env::var("HAVEN_AUTH__JWT_SECRET")
        .or_else(|_| env::var("JWT_SECRET"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = store_api_key {
        builder = builder.set_override("store.api_key", api_key)?;
    }
    if let Some(endpoint) = store_endpoint {
        builder = builder.set_override("store.endpoint", endpoint)?;
    }
    if let Some(secret) = jwt_secret {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_feed_settings() {
        let feed = FeedSettings::default();
        assert_eq!(feed.default_limit, 25);
        assert_eq!(feed.max_limit, 50);
        assert_eq!(feed.batch_cap, 150);
        assert_eq!(feed.refill_rounds, 2);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }
}
