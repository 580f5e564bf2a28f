//! Application configuration loaded from environment variables.

use std::time::Duration;

use coordinator::PublisherConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; the in-memory store is
///   used when unset
/// - `PUBLISHER_QUEUE_CAPACITY`: outgoing message queue size (default: `1024`)
/// - `PUBLISHER_MAX_ATTEMPTS`: delivery attempts per message (default: `5`)
/// - `PUBLISHER_RETRY_BASE_MS`: first retry delay in ms (default: `50`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub publisher: PublisherConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = PublisherConfig::default();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT").unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            publisher: PublisherConfig {
                queue_capacity: parse_var("PUBLISHER_QUEUE_CAPACITY")
                    .unwrap_or(defaults.queue_capacity),
                max_attempts: parse_var("PUBLISHER_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts),
                retry_base: parse_var("PUBLISHER_RETRY_BASE_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry_base),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            publisher: PublisherConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
