//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_product, get_product, get_products, liveness, readiness, AppState,
};
use super::openapi::openapi_json;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Catalog endpoints
        .route("/products", get(get_products))
        .route("/product/:item_id", get(get_product))
        .route("/product", post(add_product))
        // Health endpoints
        .route("/health/readiness", get(readiness))
        .route("/health/liveness", get(liveness))
        // API description
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
