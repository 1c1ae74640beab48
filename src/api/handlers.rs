//! HTTP API handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogStore, Product};
use crate::config::Config;
use crate::health::{store_check, HealthRegistry, HealthReport};
use crate::metrics::{self, StoreTimer};
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};

/// Name of the breaker guarding catalog reads.
pub const PRODUCT_BREAKER: &str = "product-circuit-breaker";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Catalog data store client.
    pub store: Arc<dyn CatalogStore>,
    /// Breaker guarding the read handlers.
    pub breaker: Arc<CircuitBreaker>,
    /// Liveness procedures.
    pub health: Arc<HealthRegistry>,
}

impl AppState {
    /// Create app state around `store`, registering the store health check.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        breaker_config: CircuitBreakerConfig,
        health_timeout: Duration,
    ) -> Self {
        let mut health = HealthRegistry::new(health_timeout);
        health.register("health", store_check(store.clone()));

        Self {
            store,
            breaker: Arc::new(CircuitBreaker::new(PRODUCT_BREAKER, breaker_config)),
            health: Arc::new(health),
        }
    }

    /// Create app state from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn CatalogStore>) -> Self {
        Self::new(store, config.breaker_config(), config.health_timeout())
    }
}

/// Serialize `value` as pretty-printed JSON with the JSON content type.
fn pretty_json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!("Failed to encode response: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn service_unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response()
}

/// List all products.
#[utoipa::path(
    get,
    path = "/products",
    tag = "catalog",
    responses(
        (status = 200, description = "All catalog entries", body = [Product]),
        (status = 503, description = "Store unavailable or circuit open")
    )
)]
pub async fn get_products(State(state): State<AppState>) -> Response {
    let start = Instant::now();

    let result = state
        .breaker
        .execute(|| async {
            let _timer = StoreTimer::new("get_products");
            state.store.get_products().await
        })
        .await;

    let response = match result {
        Ok(products) => {
            debug!(count = products.len(), "Listing products");
            pretty_json(StatusCode::OK, &products)
        }
        Err(e) => {
            warn!(error = %e, "Failed to list products");
            service_unavailable()
        }
    };

    metrics::record_http_latency(start, "get_products", response.status().as_u16());
    response
}

/// Fetch one product by item id.
#[utoipa::path(
    get,
    path = "/product/{item_id}",
    tag = "catalog",
    params(("item_id" = String, Path, description = "Catalog item id")),
    responses(
        (status = 200, description = "Catalog entry", body = Product),
        (status = 404, description = "No entry with this id"),
        (status = 503, description = "Store unavailable or circuit open")
    )
)]
pub async fn get_product(State(state): State<AppState>, Path(item_id): Path<String>) -> Response {
    let start = Instant::now();

    let result = state
        .breaker
        .execute(|| async {
            let _timer = StoreTimer::new("get_product");
            state.store.get_product(&item_id).await
        })
        .await;

    let response = match result {
        Ok(Some(product)) => pretty_json(StatusCode::OK, &product),
        Ok(None) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        Err(e) => {
            warn!(item_id = %item_id, error = %e, "Failed to fetch product");
            service_unavailable()
        }
    };

    metrics::record_http_latency(start, "get_product", response.status().as_u16());
    response
}

/// Create or replace a product.
#[utoipa::path(
    post,
    path = "/product",
    tag = "catalog",
    request_body = Product,
    responses(
        (status = 201, description = "Product stored"),
        (status = 400, description = "Body is not a product document"),
        (status = 500, description = "Store rejected the write")
    )
)]
pub async fn add_product(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    let response = match serde_json::from_slice::<Product>(&body) {
        Err(e) => {
            debug!(error = %e, "Rejecting undecodable product body");
            (StatusCode::BAD_REQUEST, format!("Invalid product: {}", e)).into_response()
        }
        Ok(product) => {
            let item_id = product.item_id.clone();
            let result = {
                let _timer = StoreTimer::new("add_product");
                state.store.add_product(product).await
            };

            match result {
                Ok(()) => {
                    info!(item_id = %item_id, "Product added");
                    metrics::inc_products_created();
                    StatusCode::CREATED.into_response()
                }
                Err(e) => {
                    error!(item_id = %item_id, error = %e, "Failed to add product");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
                }
            }
        }
    };

    metrics::record_http_latency(start, "add_product", response.status().as_u16());
    response
}

/// Readiness check handler - always returns 200 once the server is accepting.
#[utoipa::path(
    get,
    path = "/health/readiness",
    tag = "health",
    responses((status = 200, description = "Server is accepting requests", body = String, content_type = "text/plain"))
)]
pub async fn readiness() -> Response {
    let start = Instant::now();
    let response = "OK".into_response();
    metrics::record_http_latency(start, "readiness", response.status().as_u16());
    response
}

/// Liveness check handler - runs the health procedures, 503 if any is down.
#[utoipa::path(
    get,
    path = "/health/liveness",
    tag = "health",
    responses(
        (status = 200, description = "All procedures up", body = HealthReport),
        (status = 503, description = "At least one procedure down", body = HealthReport)
    )
)]
pub async fn liveness(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let report = state.health.run().await;

    let response = if report.outcome.is_up() {
        metrics::record_health_outcome("up");
        pretty_json(StatusCode::OK, &report)
    } else {
        metrics::record_health_outcome("down");
        warn!(checks = ?report.checks, "Liveness check failed");
        pretty_json(StatusCode::SERVICE_UNAVAILABLE, &report)
    };

    metrics::record_http_latency(start, "liveness", response.status().as_u16());
    response
}
