//! Catalog module: product entries and the data store they live in.
//!
//! This module handles:
//! - Product types and JSON shape
//! - The store client seam shared by handlers and health checks
//! - In-memory store (default) and upstream HTTP store
//! - Mock store for testing

pub mod memory;
pub mod mock;
pub mod remote;
pub mod store;
pub mod types;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::CatalogError;

pub use memory::InMemoryStore;
pub use mock::{MockCatalogStore, MockConfig};
pub use remote::RemoteStore;
pub use store::CatalogStore;
pub use types::Product;

/// Build the store selected by configuration.
pub fn store_from_config(config: &Config) -> Result<Arc<dyn CatalogStore>, CatalogError> {
    if let Some(url) = &config.catalog_store_url {
        info!(url = %url, "Using upstream catalog store");
        return Ok(Arc::new(RemoteStore::new(url, config.store_timeout())?));
    }

    let store = match &config.catalog_seed_file {
        Some(path) => InMemoryStore::from_seed_file(path)?,
        None => InMemoryStore::new(),
    };
    info!(products = store.len(), "Using in-memory catalog store");
    Ok(Arc::new(store))
}
