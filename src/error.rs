//! Unified error types for the catalog service.

use thiserror::Error;

/// Unified error type for the catalog service.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Listen address could not be parsed.
    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a catalog data store client.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write.
    #[error("store rejected write: {0}")]
    Rejected(String),

    /// Store response could not be decoded.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// HTTP transport error talking to a remote store.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of a call rejected or failed under the circuit breaker.
#[derive(Error, Debug)]
pub enum BreakerError<E> {
    /// Circuit is open (or a half-open probe is already in flight).
    #[error("circuit breaker is open")]
    Open,

    /// Operation did not complete within the call timeout.
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured call timeout.
        timeout_ms: u64,
    },

    /// Operation completed with an error.
    #[error("operation failed: {0}")]
    Failed(E),
}

impl<E> BreakerError<E> {
    /// Whether the call was rejected without running the operation.
    pub fn is_rejected(&self) -> bool {
        matches!(self, BreakerError::Open)
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, CatalogError>;
