//! Configuration module for the Flock admin client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the REST backend, without a trailing slash
    pub api_base_url: String,
    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
    /// Expiry window for cached queries
    pub cache_ttl: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base_url = env::var("FLOCK_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let request_timeout = seconds_var("FLOCK_REQUEST_TIMEOUT_SECS")
            .unwrap_or(defaults.request_timeout);

        let cache_ttl = seconds_var("FLOCK_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl);

        let log_level = env::var("FLOCK_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match env::var("FLOCK_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            api_base_url,
            request_timeout,
            cache_ttl,
            log_level,
            log_format,
        }
    }
}

/// Read a whole number of seconds, warning and ignoring values that do not parse.
fn seconds_var(name: &str) -> Option<Duration> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}
