//! Application configuration loaded from environment variables.

use std::time::Duration;

use messaging::RetryPolicy;

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` bind address of the admin endpoints (default: `"0.0.0.0"`)
/// - `PORT` listen port of the admin endpoints (default: `3000`)
/// - `RUST_LOG` tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` `text` or `json` (default: `text`)
/// - `DATABASE_URL` PostgreSQL read store; unset means in-memory
/// - `PUBLISH_MAX_ATTEMPTS` (default: `3`)
/// - `PUBLISH_INITIAL_BACKOFF_MS` (default: `50`)
/// - `PUBLISH_MAX_BACKOFF_MS` (default: `1000`)
///
/// Unparsable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub publish_max_attempts: u32,
    pub publish_initial_backoff_ms: u64,
    pub publish_max_backoff_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the raw value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        fn parse_var<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            publish_max_attempts: parse_var(&lookup, "PUBLISH_MAX_ATTEMPTS")
                .unwrap_or(defaults.publish_max_attempts),
            publish_initial_backoff_ms: parse_var(&lookup, "PUBLISH_INITIAL_BACKOFF_MS")
                .unwrap_or(defaults.publish_initial_backoff_ms),
            publish_max_backoff_ms: parse_var(&lookup, "PUBLISH_MAX_BACKOFF_MS")
                .unwrap_or(defaults.publish_max_backoff_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the retry policy for outgoing messages.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.publish_max_attempts,
            Duration::from_millis(self.publish_initial_backoff_ms),
            Duration::from_millis(self.publish_max_backoff_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            publish_max_attempts: 3,
            publish_initial_backoff_ms: 50,
            publish_max_backoff_ms: 1000,
        }
    }
}
