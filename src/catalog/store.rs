//! Data store client seam.

use futures::future::BoxFuture;

use crate::error::StoreError;

use super::types::Product;

/// Client for the external store holding catalog entries.
///
/// Methods return boxed futures so the store can be shared as
/// `Arc<dyn CatalogStore>` across handlers.
pub trait CatalogStore: Send + Sync + std::fmt::Debug {
    /// Fetch every catalog entry.
    fn get_products(&self) -> BoxFuture<'_, Result<Vec<Product>, StoreError>>;

    /// Fetch a single entry. `Ok(None)` when the id is unknown.
    fn get_product<'a>(
        &'a self,
        item_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Product>, StoreError>>;

    /// Insert or replace an entry.
    fn add_product(&self, product: Product) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Cheap liveness probe of the store connection.
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Short name used in logs and metrics.
    fn kind(&self) -> &'static str;
}
