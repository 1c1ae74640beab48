//! HTTP client for an upstream catalog speaking the same API.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use tracing::{debug, debug_span, warn, Instrument};
use url::Url;

use crate::error::{CatalogError, StoreError};

use super::store::CatalogStore;
use super::types::Product;

/// Catalog store that forwards to an upstream catalog service.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    /// HTTP client for store requests.
    http: reqwest::Client,
    /// Upstream base URL.
    base_url: Url,
    /// Request and connect timeout.
    timeout: Duration,
}

impl RemoteStore {
    /// Create a remote store client for the given base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::InvalidConfig(format!("store url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidConfig(format!(
                "store url {} cannot be used as a base",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(StoreError::from)?;

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// Timeout applied to connecting and to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upstream base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl CatalogStore for RemoteStore {
    fn get_products(&self) -> BoxFuture<'_, Result<Vec<Product>, StoreError>> {
        let url = self.endpoint(&["products"]);
        async move {
            let response = self.http.get(url).send().await?;
            if !response.status().is_success() {
                return Err(StoreError::Unavailable(format!("HTTP {}", response.status())));
            }

            let products: Vec<Product> = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(format!("Failed to parse products: {}", e)))?;
            debug!(count = products.len(), "Fetched products from upstream");
            Ok(products)
        }
        .instrument(debug_span!("remote_get_products"))
        .boxed()
    }

    fn get_product<'a>(
        &'a self,
        item_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Product>, StoreError>> {
        let url = self.endpoint(&["product", item_id]);
        async move {
            let response = self.http.get(url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(StoreError::Unavailable(format!("HTTP {}", response.status())));
            }

            let product: Product = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(format!("Failed to parse product: {}", e)))?;
            Ok(Some(product))
        }
        .instrument(debug_span!("remote_get_product", item_id = %item_id))
        .boxed()
    }

    fn add_product(&self, product: Product) -> BoxFuture<'_, Result<(), StoreError>> {
        let url = self.endpoint(&["product"]);
        let item_id = product.item_id.clone();
        async move {
            let response = self.http.post(url).json(&product).send().await?;
            if !response.status().is_success() {
                warn!(status = %response.status(), "Upstream rejected product");
                return Err(StoreError::Rejected(format!("HTTP {}", response.status())));
            }
            Ok(())
        }
        .instrument(debug_span!("remote_add_product", item_id = %item_id))
        .boxed()
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        let url = self.endpoint(&["health", "readiness"]);
        async move {
            let response = self.http.get(url).send().await?;
            if !response.status().is_success() {
                return Err(StoreError::Unavailable(format!("HTTP {}", response.status())));
            }
            Ok(())
        }
        .instrument(debug_span!("remote_ping"))
        .boxed()
    }

    fn kind(&self) -> &'static str {
        "remote"
    }
}
