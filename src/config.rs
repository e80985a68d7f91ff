use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HairgenError, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
/// InstantID build on Replicate; best identity preservation of the hosted face models.
pub const DEFAULT_MODEL: &str =
    "wangfuyun/instantid:c6b5d2b7459910fec94432e9e1203c3cdce92d6db20f714f1355747990b52fa6";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub index_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_token: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub replicate: ReplicateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
            index_file: PathBuf::from("index.html"),
        }
    }
}

impl ServerConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            index_file: lookup("INDEX_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_file),
        }
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        ReplicateConfig {
            api_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ReplicateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the API token, or a config error naming the variable to set.
    pub fn require_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| HairgenError::ConfigError("REPLICATE_API_TOKEN is not set".into()))
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        ReplicateConfig {
            api_token: lookup("REPLICATE_API_TOKEN"),
            api_base: lookup("REPLICATE_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            model: lookup("REPLICATE_MODEL").unwrap_or(defaults.model),
            timeout: lookup("REPLICATE_TIMEOUT_SECS")
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            poll_interval: lookup("REPLICATE_POLL_INTERVAL_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Config {
            server: ServerConfig::from_lookup(&lookup),
            replicate: ReplicateConfig::from_lookup(&lookup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.index_file, PathBuf::from("index.html"));
        assert_eq!(config.replicate.api_base, DEFAULT_API_BASE);
        assert_eq!(config.replicate.model, DEFAULT_MODEL);
        assert!(config.replicate.api_token.is_none());
        assert!(config.replicate.require_token().is_err());
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("REPLICATE_API_TOKEN", "r8_secret"),
            ("REPLICATE_API_BASE", "http://localhost:1234/v1/"),
            ("REPLICATE_TIMEOUT_SECS", "12"),
            ("REPLICATE_POLL_INTERVAL_MS", "50"),
        ]));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.replicate.require_token().unwrap(), "r8_secret");
        assert_eq!(config.replicate.api_base, "http://localhost:1234/v1");
        assert_eq!(config.replicate.timeout, Duration::from_secs(12));
        assert_eq!(config.replicate.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("REPLICATE_API_TOKEN", "   "),
        ]));
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.replicate.api_token.is_none());
    }
}
