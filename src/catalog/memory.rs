//! In-process catalog store.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info};

use crate::error::{CatalogError, StoreError};

use super::store::CatalogStore;
use super::types::Product;

/// Catalog store backed by a concurrent map keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    products: Arc<DashMap<String, Product>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        for product in products {
            store.products.insert(product.item_id.clone(), product);
        }
        store
    }

    /// Load a JSON array of products from disk.
    pub fn from_seed_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&content)?;
        info!(path = %path.display(), count = products.len(), "Seeded in-memory catalog");
        Ok(Self::with_products(products))
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn snapshot(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        products.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        products
    }
}

impl CatalogStore for InMemoryStore {
    fn get_products(&self) -> BoxFuture<'_, Result<Vec<Product>, StoreError>> {
        async move { Ok(self.snapshot()) }.boxed()
    }

    fn get_product<'a>(
        &'a self,
        item_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Product>, StoreError>> {
        async move { Ok(self.products.get(item_id).map(|entry| entry.value().clone())) }.boxed()
    }

    fn add_product(&self, product: Product) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            debug!(item_id = %product.item_id, "Storing product");
            self.products.insert(product.item_id.clone(), product);
            Ok(())
        }
        .boxed()
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
