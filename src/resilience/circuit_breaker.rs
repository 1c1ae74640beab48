//! Circuit breaker for data store calls.
//!
//! # States
//! - Closed: calls pass through, consecutive failures are counted
//! - Open: store assumed down, calls fail fast
//! - HalfOpen: a single probe call tests whether the store recovered
//!
//! # State Transitions
//! ```text
//! Closed   → Open:     consecutive failures >= max_failures
//! Open     → HalfOpen: first call after reset_timeout
//! HalfOpen → Closed:   probe succeeds
//! HalfOpen → Open:     probe fails or times out
//! ```
//!
//! A call that does not finish within `call_timeout` counts as a failure.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use strum::{Display, EnumString};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::BreakerError;
use crate::metrics;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CircuitState {
    /// Normal operation.
    Closed,
    /// Calls are rejected without reaching the store.
    Open,
    /// One probe call is allowed through.
    HalfOpen,
}

impl CircuitState {
    /// Numeric encoding for the state gauge.
    pub fn as_gauge(&self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        }
    }
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit.
    pub max_failures: u32,
    /// A call exceeding this duration is failed.
    pub call_timeout: Duration,
    /// Time spent open before a probe is allowed.
    pub reset_timeout: Duration,
    /// Use the fallback on every failure, not only when open.
    pub fallback_on_failure: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            call_timeout: Duration::from_millis(1000),
            reset_timeout: Duration::from_millis(5000),
            fallback_on_failure: true,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_started: Option<Instant>,
    open_count: u64,
}

/// Snapshot of breaker counters.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitStats {
    /// Current state.
    pub state: CircuitState,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Number of times the circuit has opened.
    pub open_count: u64,
}

/// Circuit breaker guarding a single dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a new closed circuit breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        metrics::set_breaker_state(&name, CircuitState::Closed);
        Self {
            name,
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_started: None,
                open_count: 0,
            }),
        }
    }

    /// Breaker name used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Breaker configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Failures counted since the last success.
    pub fn failure_count(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CircuitStats {
        let inner = self.lock();
        CircuitStats {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            open_count: inner.open_count,
        }
    }

    /// Force the circuit closed and clear counters.
    pub fn reset(&self) {
        let mut inner = self.lock();
        info!(breaker = %self.name, "Manually resetting circuit to closed");
        self.transition(&mut inner, CircuitState::Closed);
    }

    /// Run `op` under the breaker.
    ///
    /// Returns [`BreakerError::Open`] without calling `op` when the circuit
    /// rejects the call.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Err(e) = self.admit() {
            metrics::record_breaker_call(&self.name, "rejected");
            return Err(e);
        }

        match tokio::time::timeout(self.config.call_timeout, op()).await {
            Ok(Ok(value)) => {
                self.on_success();
                metrics::record_breaker_call(&self.name, "success");
                Ok(value)
            }
            Ok(Err(e)) => {
                self.on_failure();
                metrics::record_breaker_call(&self.name, "failure");
                Err(BreakerError::Failed(e))
            }
            Err(_) => {
                self.on_failure();
                metrics::record_breaker_call(&self.name, "timeout");
                Err(BreakerError::Timeout {
                    timeout_ms: self.config.call_timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Run `op` under the breaker, substituting `fallback` for a rejected
    /// call, or for any failure when `fallback_on_failure` is set.
    pub async fn execute_with_fallback<T, E, F, Fut, FB>(
        &self,
        op: F,
        fallback: FB,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce(&BreakerError<E>) -> T,
    {
        match self.execute(op).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_rejected() || self.config.fallback_on_failure => {
                debug!(breaker = %self.name, error = %DisplayKind(&e), "Using fallback");
                Ok(fallback(&e))
            }
            Err(e) => Err(e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn admit<E>(&self) -> Result<(), BreakerError<E>> {
        let mut inner = self.lock();
        let now = Instant::now();

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| now.duration_since(t))
                    .unwrap_or(self.config.reset_timeout);
                if elapsed >= self.config.reset_timeout {
                    info!(breaker = %self.name, "Circuit transitioning from open to half-open");
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.probe_started = Some(now);
                    Ok(())
                } else {
                    Err(BreakerError::Open)
                }
            }
            CircuitState::HalfOpen => {
                // A probe abandoned by its caller never reports back; let a new
                // one through once the old one could no longer be running.
                let stale = inner
                    .probe_started
                    .map(|t| now.duration_since(t) > self.config.call_timeout)
                    .unwrap_or(true);
                if stale {
                    inner.probe_started = Some(now);
                    Ok(())
                } else {
                    Err(BreakerError::Open)
                }
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => inner.consecutive_failures = 0,
            CircuitState::HalfOpen => {
                info!(breaker = %self.name, "Probe succeeded, circuit closing");
                self.transition(&mut inner, CircuitState::Closed);
            }
            CircuitState::Open => {
                debug!(breaker = %self.name, "Late success while open ignored");
            }
        }
    }

    fn on_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                debug!(
                    breaker = %self.name,
                    consecutive_failures = inner.consecutive_failures,
                    threshold = self.config.max_failures,
                    "Call failed in closed state"
                );
                if inner.consecutive_failures >= self.config.max_failures {
                    warn!(
                        breaker = %self.name,
                        consecutive_failures = inner.consecutive_failures,
                        "Circuit transitioning from closed to open"
                    );
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                warn!(breaker = %self.name, "Probe failed, reopening circuit");
                self.transition(&mut inner, CircuitState::Open);
            }
            CircuitState::Open => {}
        }
    }

    fn transition(&self, inner: &mut BreakerInner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.probe_started = None;
        match to {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
                inner.opened_at = None;
            }
            CircuitState::Open => {
                inner.opened_at = Some(Instant::now());
                inner.open_count += 1;
            }
            CircuitState::HalfOpen => {}
        }

        if from != to {
            metrics::record_breaker_transition(&self.name, to);
        }
        metrics::set_breaker_state(&self.name, to);
    }
}

struct DisplayKind<'a, E>(&'a BreakerError<E>);

impl<E> std::fmt::Display for DisplayKind<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            BreakerError::Open => write!(f, "open"),
            BreakerError::Timeout { timeout_ms } => write!(f, "timeout after {}ms", timeout_ms),
            BreakerError::Failed(_) => write!(f, "failed"),
        }
    }
}
