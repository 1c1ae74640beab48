//! Prometheus metrics for request latency, store calls, and the breaker.
//!
//! This module provides metrics for:
//! - HTTP request latency per endpoint
//! - Data store call latency per operation
//! - Circuit breaker call outcomes, transitions, and current state
//! - Products created and health check outcomes

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

use crate::resilience::CircuitState;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "catalog_http_request_latency_ms";
/// Store call latency metric name.
pub const METRIC_STORE_CALL_LATENCY: &str = "catalog_store_call_latency_ms";
/// Breaker call outcomes counter metric name.
pub const METRIC_BREAKER_CALLS: &str = "circuit_breaker_calls_total";
/// Breaker transitions counter metric name.
pub const METRIC_BREAKER_TRANSITIONS: &str = "circuit_breaker_transitions_total";
/// Breaker state gauge metric name.
pub const METRIC_BREAKER_STATE: &str = "circuit_breaker_state";
/// Products created counter metric name.
pub const METRIC_PRODUCTS_CREATED: &str = "catalog_products_created_total";
/// Health check runs counter metric name.
pub const METRIC_HEALTH_CHECKS: &str = "catalog_health_checks_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_STORE_CALL_LATENCY,
        "Data store call latency in milliseconds"
    );

    describe_counter!(
        METRIC_BREAKER_CALLS,
        "Calls made through the circuit breaker, by outcome"
    );
    describe_counter!(
        METRIC_BREAKER_TRANSITIONS,
        "Circuit breaker state transitions, by target state"
    );
    describe_gauge!(
        METRIC_BREAKER_STATE,
        "Circuit breaker state (0=closed, 1=half-open, 2=open)"
    );
    describe_counter!(
        METRIC_PRODUCTS_CREATED,
        "Total number of products created"
    );
    describe_counter!(
        METRIC_HEALTH_CHECKS,
        "Liveness check runs, by outcome"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter listening on `addr`.
pub fn install_prometheus(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &'static str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .record(latency_ms);
}

/// Record data store call latency.
pub fn record_store_latency(start: Instant, operation: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_STORE_CALL_LATENCY, "operation" => operation).record(latency_ms);
}

/// Increment breaker call counter for an outcome.
pub fn record_breaker_call(breaker: &str, outcome: &'static str) {
    counter!(METRIC_BREAKER_CALLS, "breaker" => breaker.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Increment breaker transition counter.
pub fn record_breaker_transition(breaker: &str, to: CircuitState) {
    counter!(
        METRIC_BREAKER_TRANSITIONS,
        "breaker" => breaker.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

/// Set the breaker state gauge.
pub fn set_breaker_state(breaker: &str, state: CircuitState) {
    gauge!(METRIC_BREAKER_STATE, "breaker" => breaker.to_string()).set(state.as_gauge());
}

/// Increment products created counter.
pub fn inc_products_created() {
    counter!(METRIC_PRODUCTS_CREATED).increment(1);
}

/// Increment health check counter for an outcome.
pub fn record_health_outcome(outcome: &'static str) {
    counter!(METRIC_HEALTH_CHECKS, "outcome" => outcome).increment(1);
}

/// RAII guard for timing store calls.
/// Automatically records latency when dropped.
pub struct StoreTimer {
    start: Instant,
    operation: &'static str,
}

impl StoreTimer {
    /// Create a new timer for the given store operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for StoreTimer {
    fn drop(&mut self) {
        record_store_latency(self.start, self.operation);
    }
}
