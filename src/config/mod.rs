use serde::Deserialize;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use thiserror::Error;

use crate::services::mock::MockLatency;
use crate::services::poller::PollPolicy;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client settings with environment variable support
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Remote API
    pub api_url: String,
    pub api_prefix: String,

    // Data source selection
    pub use_mock_data: bool,
    pub mock_latency_enabled: bool,

    // Transport
    pub http_timeout_seconds: f64,
    pub rate_limit_requests: u32,

    // Summary polling
    pub poll_interval_ms: u64,
    pub poll_backoff_factor: f64,
    pub poll_max_interval_ms: u64,
    pub poll_max_attempts: u32,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Settings {
    /// Create new settings instance from environment variables and .env file
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_env_file(true)
    }

    /// Create new settings instance with optional .env file loading
    pub fn new_with_env_file(load_env_file: bool) -> Result<Self, ConfigError> {
        // Tests mutate process env; serialize reads so a build sees one consistent snapshot
        static SETTINGS_BUILD_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        let build_mutex = SETTINGS_BUILD_MUTEX.get_or_init(|| Mutex::new(()));
        let _guard = build_mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if load_env_file {
            dotenvy::dotenv().ok();
        }

        let mut builder = config::Config::builder()
            .set_default("api_url", "http://localhost:3000")?
            .set_default("api_prefix", "/api/v1")?
            .set_default("use_mock_data", cfg!(feature = "mock-data"))?
            .set_default("mock_latency_enabled", true)?
            .set_default("http_timeout_seconds", 30.0)?
            .set_default("rate_limit_requests", 20u32)?
            .set_default("poll_interval_ms", 2000u64)?
            .set_default("poll_backoff_factor", 1.5)?
            .set_default("poll_max_interval_ms", 10_000u64)?
            .set_default("poll_max_attempts", 30u32)?
            .set_default("log_level", "INFO")?
            .set_default("log_format", "plain")?;

        fn read_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        }

        fn parse_bool_env(key: &str) -> Option<bool> {
            read_env(key).and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            })
        }

        // String overrides
        if let Some(v) = read_env("API_URL") { builder = builder.set_override("api_url", v)?; }
        if let Some(v) = read_env("API_PREFIX") { builder = builder.set_override("api_prefix", v)?; }
        if let Some(v) = read_env("LOG_LEVEL") { builder = builder.set_override("log_level", v)?; }
        if let Some(v) = read_env("LOG_FORMAT") { builder = builder.set_override("log_format", v)?; }

        // Numeric overrides
        if let Some(v) = read_env("HTTP_TIMEOUT_SECONDS").and_then(|s| s.parse::<f64>().ok()) { builder = builder.set_override("http_timeout_seconds", v)?; }
        if let Some(v) = read_env("RATE_LIMIT_REQUESTS").and_then(|s| s.parse::<u32>().ok()) { builder = builder.set_override("rate_limit_requests", v)?; }
        if let Some(v) = read_env("POLL_INTERVAL_MS").and_then(|s| s.parse::<u64>().ok()) { builder = builder.set_override("poll_interval_ms", v)?; }
        if let Some(v) = read_env("POLL_BACKOFF_FACTOR").and_then(|s| s.parse::<f64>().ok()) { builder = builder.set_override("poll_backoff_factor", v)?; }
        if let Some(v) = read_env("POLL_MAX_INTERVAL_MS").and_then(|s| s.parse::<u64>().ok()) { builder = builder.set_override("poll_max_interval_ms", v)?; }
        if let Some(v) = read_env("POLL_MAX_ATTEMPTS").and_then(|s| s.parse::<u32>().ok()) { builder = builder.set_override("poll_max_attempts", v)?; }

        // Boolean overrides
        if let Some(v) = parse_bool_env("USE_MOCK_DATA") { builder = builder.set_override("use_mock_data", v)?; }
        if let Some(v) = parse_bool_env("MOCK_LATENCY_ENABLED") { builder = builder.set_override("mock_latency_enabled", v)?; }

        let settings = builder.build()?;

        let config: Settings = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::Parse(format!("api_url '{}': {}", self.api_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "api_url must use http or https".to_string()
            ));
        }

        if !self.api_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "api_prefix must start with '/'".to_string()
            ));
        }

        if !matches!(self.log_format.to_lowercase().as_str(), "json" | "plain") {
            return Err(ConfigError::Validation(
                "log_format must be 'json' or 'plain'".to_string()
            ));
        }

        if self.http_timeout_seconds <= 0.0 {
            return Err(ConfigError::Validation(
                "http_timeout_seconds must be greater than 0".to_string()
            ));
        }

        if self.rate_limit_requests == 0 {
            return Err(ConfigError::Validation(
                "rate_limit_requests must be greater than 0".to_string()
            ));
        }

        if self.poll_max_attempts == 0 {
            return Err(ConfigError::Validation(
                "poll_max_attempts must be greater than 0".to_string()
            ));
        }

        if self.poll_backoff_factor < 1.0 {
            return Err(ConfigError::Validation(
                "poll_backoff_factor must be at least 1.0".to_string()
            ));
        }

        if self.poll_max_interval_ms < self.poll_interval_ms {
            return Err(ConfigError::Validation(
                "poll_max_interval_ms must not be smaller than poll_interval_ms".to_string()
            ));
        }

        Ok(())
    }

    /// Origin plus version prefix, e.g. `http://localhost:3000/api/v1`
    pub fn api_base_url(&self) -> String {
        format!(
            "{}{}",
            self.api_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http_timeout_seconds)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            backoff_factor: self.poll_backoff_factor,
            max_interval: Duration::from_millis(self.poll_max_interval_ms),
            max_attempts: self.poll_max_attempts,
        }
    }

    pub fn mock_latency(&self) -> MockLatency {
        if self.mock_latency_enabled {
            MockLatency::default()
        } else {
            MockLatency::none()
        }
    }
}
