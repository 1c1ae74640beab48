//! Resilience wrappers around data store calls.

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
