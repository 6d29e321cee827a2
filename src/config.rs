//! Client configuration.
//!
//! Configuration can be built programmatically with the `with_*` methods or
//! loaded from the environment (`AERODATA_*` variables, with `.env` support).

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.aerodata.io";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CLOSE_TIMEOUT_SECS: u64 = 2;

/// Settings shared by the REST transport and the realtime channel.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API authentication key, sent as a bearer token.
    pub api_key: String,
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,
    /// Attempt budget for transport-level failures (timeouts, refused
    /// connections). Mapped API errors are never retried.
    pub max_retries: u32,
    /// Bounded wait for the realtime channel to reach `Connected`.
    pub connect_timeout: Duration,
    /// Bounded wait for the realtime background task to stop on `close()`.
    pub close_timeout: Duration,
}

/// Partial configuration deserialized from the environment.
///
/// Missing values fall back to the defaults in [`ClientConfig::new`].
#[derive(Debug, Deserialize)]
struct PartialConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            close_timeout: Duration::from_secs(DEFAULT_CLOSE_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Loads configuration from `AERODATA_*` environment variables, reading a
    /// `.env` file first when one is present. `AERODATA_API_KEY` is required;
    /// everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = Config::builder()
            .add_source(Environment::with_prefix("AERODATA").try_parsing(true))
            .build()?;
        let partial: PartialConfig = cfg.try_deserialize()?;

        let api_key = partial
            .api_key
            .ok_or_else(|| ConfigError::NotFound("AERODATA_API_KEY".to_string()))?;

        let mut out = Self::new(api_key);
        if let Some(base_url) = partial.base_url {
            out = out.with_base_url(base_url);
        }
        if let Some(secs) = partial.timeout_secs {
            out.timeout = Duration::from_secs(secs);
        }
        if let Some(max_retries) = partial.max_retries {
            out.max_retries = max_retries;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.close_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig::new("k").with_base_url("http://localhost:3000/");
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("AERODATA_API_KEY", Some("env-key")),
                ("AERODATA_BASE_URL", Some("http://localhost:4000")),
                ("AERODATA_TIMEOUT_SECS", Some("10")),
            ],
            || {
                let config = ClientConfig::from_env().expect("config should load");
                assert_eq!(config.api_key, "env-key");
                assert_eq!(config.base_url, "http://localhost:4000");
                assert_eq!(config.timeout, Duration::from_secs(10));
                assert_eq!(config.max_retries, 3);
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        temp_env::with_vars_unset(["AERODATA_API_KEY"], || {
            assert!(ClientConfig::from_env().is_err());
        });
    }
}
