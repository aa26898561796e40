//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::DEFAULT_TAX_PERCENT;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `TAX_PERCENT` — tax rate applied at checkout (default: `7`)
/// - `STORE_TIMEOUT_MS` — per-call persistence timeout (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub tax_percent: u32,
    pub store_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            tax_percent: std::env::var("TAX_PERCENT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_TAX_PERCENT),
            store_timeout: std::env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(checkout::DEFAULT_STORE_TIMEOUT),
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
            tax_percent: DEFAULT_TAX_PERCENT,
            store_timeout: checkout::DEFAULT_STORE_TIMEOUT,
        }
    }
}
