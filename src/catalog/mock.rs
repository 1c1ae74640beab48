//! Mock catalog store for unit and integration testing.
//!
//! This module provides a store whose failures and latency can be switched
//! at runtime, so tests can trip the circuit breaker and the health check
//! without a real data store.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use crate::error::StoreError;

use super::memory::InMemoryStore;
use super::store::CatalogStore;
use super::types::Product;

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail read requests.
    pub fail_reads: bool,
    /// Whether to fail write requests.
    pub fail_writes: bool,
    /// Whether to fail pings.
    pub fail_ping: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

#[derive(Debug, Default)]
struct MockSwitches {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_ping: AtomicBool,
    latency_ms: AtomicU64,
    read_calls: AtomicUsize,
}

/// Mock catalog store for testing.
#[derive(Debug, Clone, Default)]
pub struct MockCatalogStore {
    /// Backing products.
    inner: InMemoryStore,
    /// Runtime behavior switches.
    switches: Arc<MockSwitches>,
}

impl MockCatalogStore {
    /// Create a new mock store with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        let store = Self::new();
        store.set_fail_reads(config.fail_reads);
        store.set_fail_writes(config.fail_writes);
        store.set_fail_ping(config.fail_ping);
        store.set_latency_ms(config.latency_ms);
        store
    }

    /// Create a mock store holding the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            inner: InMemoryStore::with_products(products),
            switches: Arc::default(),
        }
    }

    /// Toggle read failures.
    pub fn set_fail_reads(&self, fail: bool) {
        self.switches.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Toggle write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        self.switches.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Toggle ping failures.
    pub fn set_fail_ping(&self, fail: bool) {
        self.switches.fail_ping.store(fail, Ordering::SeqCst);
    }

    /// Set the simulated latency.
    pub fn set_latency_ms(&self, latency_ms: u64) {
        self.switches.latency_ms.store(latency_ms, Ordering::SeqCst);
    }

    /// Number of read calls that reached the store.
    pub fn read_calls(&self) -> usize {
        self.switches.read_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency_ms = self.switches.latency_ms.load(Ordering::SeqCst);
        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }
    }

    fn check_read(&self) -> Result<(), StoreError> {
        self.switches.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.switches.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock read failure".to_string()));
        }
        Ok(())
    }
}

impl CatalogStore for MockCatalogStore {
    fn get_products(&self) -> BoxFuture<'_, Result<Vec<Product>, StoreError>> {
        async move {
            self.simulate_latency().await;
            self.check_read()?;
            self.inner.get_products().await
        }
        .boxed()
    }

    fn get_product<'a>(
        &'a self,
        item_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Product>, StoreError>> {
        async move {
            self.simulate_latency().await;
            self.check_read()?;
            self.inner.get_product(item_id).await
        }
        .boxed()
    }

    fn add_product(&self, product: Product) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            self.simulate_latency().await;
            if self.switches.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Rejected("Mock write failure".to_string()));
            }
            self.inner.add_product(product).await
        }
        .boxed()
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            self.simulate_latency().await;
            if self.switches.fail_ping.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("Mock ping failure".to_string()));
            }
            Ok(())
        }
        .boxed()
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn reads_fail_when_switched_on() {
        let store = MockCatalogStore::with_products(vec![Product::new("329299", dec!(34.99))]);
        assert!(store.get_product("329299").await.unwrap().is_some());

        store.set_fail_reads(true);
        assert!(matches!(
            store.get_products().await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.read_calls(), 2);
    }

    #[tokio::test]
    async fn writes_fail_independently_of_reads() {
        let store = MockCatalogStore::with_config(MockConfig {
            fail_writes: true,
            ..MockConfig::default()
        });

        let result = store.add_product(Product::new("1", dec!(1))).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert!(store.get_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ping_failure_is_reported() {
        let store = MockCatalogStore::new();
        assert!(store.ping().await.is_ok());
        store.set_fail_ping(true);
        assert!(store.ping().await.is_err());
    }
}
