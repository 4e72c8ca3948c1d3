//! Application configuration loaded from environment variables.

use std::time::Duration;

use query::GatewayConfig;
use query::pagination::DEFAULT_MAX_TAKE;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL store and notify feed; unset runs in memory
/// - `ELASTICSEARCH_URL`: Elasticsearch index; unset runs in memory
/// - `SEARCH_INDEX`: Elasticsearch index name (default: `"meows"`)
/// - `NOTIFY_CHANNEL`: PostgreSQL notify channel (default: `"meow_created"`)
/// - `MAX_TAKE`: upper bound on `take` (default: `1000`)
/// - `BACKEND_TIMEOUT_MS`: per-call backend timeout (default: `2000`)
/// - `PROJECTOR_CONCURRENCY`: events applied at once (default: `16`)
///
/// Unparseable numbers fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub elasticsearch_url: Option<String>,
    pub search_index: String,
    pub notify_channel: String,
    pub max_take: u64,
    pub backend_timeout: Duration,
    pub projector_concurrency: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: set("HOST").unwrap_or(defaults.host),
            port: set("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: set("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: set("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            database_url: set("DATABASE_URL"),
            elasticsearch_url: set("ELASTICSEARCH_URL"),
            search_index: set("SEARCH_INDEX").unwrap_or(defaults.search_index),
            notify_channel: set("NOTIFY_CHANNEL").unwrap_or(defaults.notify_channel),
            max_take: set("MAX_TAKE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_take),
            backend_timeout: set("BACKEND_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.backend_timeout),
            projector_concurrency: set("PROJECTOR_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.projector_concurrency),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            max_take: self.max_take,
            timeout: self.backend_timeout,
        }
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
            elasticsearch_url: None,
            search_index: search_index::elasticsearch::DEFAULT_INDEX.to_string(),
            notify_channel: event_feed::postgres::DEFAULT_CHANNEL.to_string(),
            max_take: DEFAULT_MAX_TAKE,
            backend_timeout: Duration::from_millis(2000),
            projector_concurrency: projections::processor::DEFAULT_CONCURRENCY,
        }
    }
}
