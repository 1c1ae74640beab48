//! Application configuration loaded from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::resilience::CircuitBreakerConfig;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP port the catalog API listens on.
    #[serde(default = "default_port")]
    pub catalog_http_port: u16,

    /// Interface the catalog API binds to.
    #[serde(default = "default_bind_address")]
    pub catalog_bind_address: String,

    // === Data Store ===
    /// Upstream catalog base URL. Unset means the in-memory store is used.
    #[serde(default)]
    pub catalog_store_url: Option<String>,

    /// JSON file of products loaded into the in-memory store at startup.
    #[serde(default)]
    pub catalog_seed_file: Option<PathBuf>,

    /// Request timeout for the remote store client.
    #[serde(default = "default_store_timeout")]
    pub catalog_store_timeout_ms: u64,

    // === Circuit Breaker ===
    /// Consecutive failures before the circuit opens.
    #[serde(default = "default_max_failures")]
    pub circuit_max_failures: u32,

    /// A call not completed within this time counts as a failure.
    #[serde(default = "default_circuit_timeout")]
    pub circuit_timeout_ms: u64,

    /// Time spent open before a probe is let through.
    #[serde(default = "default_reset_timeout")]
    pub circuit_reset_timeout_ms: u64,

    /// Use the fallback on any failure, not only when open.
    #[serde(default = "default_true")]
    pub circuit_fallback_on_failure: bool,

    // === Health ===
    /// Per-procedure health check timeout.
    #[serde(default = "default_health_timeout")]
    pub health_check_timeout_ms: u64,

    // === Observability ===
    /// Prometheus exporter port. Unset disables the exporter.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_store_timeout() -> u64 {
    2000
}

fn default_max_failures() -> u32 {
    3
}

fn default_circuit_timeout() -> u64 {
    1000
}

fn default_reset_timeout() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_health_timeout() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_http_port: default_port(),
            catalog_bind_address: default_bind_address(),
            catalog_store_url: None,
            catalog_seed_file: None,
            catalog_store_timeout_ms: default_store_timeout(),
            circuit_max_failures: default_max_failures(),
            circuit_timeout_ms: default_circuit_timeout(),
            circuit_reset_timeout_ms: default_reset_timeout(),
            circuit_fallback_on_failure: default_true(),
            health_check_timeout_ms: default_health_timeout(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.circuit_max_failures == 0 {
            return Err("CIRCUIT_MAX_FAILURES must be at least 1".to_string());
        }

        if self.circuit_timeout_ms == 0 {
            return Err("CIRCUIT_TIMEOUT_MS must be positive".to_string());
        }

        if self.circuit_reset_timeout_ms == 0 {
            return Err("CIRCUIT_RESET_TIMEOUT_MS must be positive".to_string());
        }

        if self.health_check_timeout_ms == 0 {
            return Err("HEALTH_CHECK_TIMEOUT_MS must be positive".to_string());
        }

        if let Some(url) = &self.catalog_store_url {
            let parsed = url::Url::parse(url)
                .map_err(|e| format!("CATALOG_STORE_URL is not a valid URL: {}", e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err("CATALOG_STORE_URL must use http or https".to_string());
            }
            if self.catalog_seed_file.is_some() {
                return Err(
                    "CATALOG_SEED_FILE only applies to the in-memory store; unset CATALOG_STORE_URL"
                        .to_string(),
                );
            }
        }

        Ok(())
    }

    /// Socket address the HTTP server binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, CatalogError> {
        let addr = format!("{}:{}", self.catalog_bind_address, self.catalog_http_port);
        Ok(addr.parse()?)
    }

    /// Circuit breaker settings for the read paths.
    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            max_failures: self.circuit_max_failures,
            call_timeout: Duration::from_millis(self.circuit_timeout_ms),
            reset_timeout: Duration::from_millis(self.circuit_reset_timeout_ms),
            fallback_on_failure: self.circuit_fallback_on_failure,
        }
    }

    /// Health check procedure timeout.
    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_check_timeout_ms)
    }

    /// Remote store request timeout.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_store_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_values_match_breaker_settings() {
        let config = Config::default();
        assert_eq!(config.catalog_http_port, 8080);
        assert_eq!(config.circuit_max_failures, 3);
        assert_eq!(config.circuit_timeout_ms, 1000);
        assert_eq!(config.circuit_reset_timeout_ms, 5000);
        assert!(config.circuit_fallback_on_failure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config: Config = envy::from_iter(env(&[])).unwrap();
        assert_eq!(config.catalog_http_port, 8080);
        assert_eq!(config.catalog_bind_address, "0.0.0.0");
        assert!(config.catalog_store_url.is_none());
        assert!(config.metrics_port.is_none());
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config: Config = envy::from_iter(env(&[
            ("CATALOG_HTTP_PORT", "9000"),
            ("CIRCUIT_MAX_FAILURES", "5"),
            ("CIRCUIT_FALLBACK_ON_FAILURE", "false"),
            ("CATALOG_STORE_URL", "http://catalog-db:8080"),
        ]))
        .unwrap();

        assert_eq!(config.catalog_http_port, 9000);
        assert_eq!(config.circuit_max_failures, 5);
        assert!(!config.circuit_fallback_on_failure);
        assert_eq!(
            config.catalog_store_url.as_deref(),
            Some("http://catalog-db:8080")
        );
    }

    #[test]
    fn log_filter_is_left_to_env_filter() {
        // RUST_LOG accepts filter directives that are not a plain level.
        let config: Config = envy::from_iter(env(&[
            ("RUST_LOG", "catalog_service=debug,tower_http=warn"),
            ("CATALOG_STORE_TIMEOUT_MS", "750"),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.store_timeout(), Duration::from_millis(750));
    }

    #[test]
    fn validate_rejects_zero_failure_threshold() {
        let config = Config {
            circuit_max_failures: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_store_url() {
        let config = Config {
            catalog_store_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            catalog_store_url: Some("ftp://catalog".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_seed_file_with_remote_store() {
        let config = Config {
            catalog_store_url: Some("http://catalog:8080".to_string()),
            catalog_seed_file: Some(PathBuf::from("products.json")),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn breaker_config_converts_durations() {
        let breaker = Config::default().breaker_config();
        assert_eq!(breaker.max_failures, 3);
        assert_eq!(breaker.call_timeout, Duration::from_millis(1000));
        assert_eq!(breaker.reset_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn listen_addr_combines_bind_address_and_port() {
        let config = Config {
            catalog_bind_address: "127.0.0.1".to_string(),
            catalog_http_port: 8181,
            ..Config::default()
        };
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8181");
    }
}
