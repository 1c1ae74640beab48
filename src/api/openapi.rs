//! OpenAPI document for the catalog API.

use std::time::Instant;

use axum::response::{IntoResponse, Response};
use axum::Json;
use utoipa::OpenApi;

use crate::catalog::Product;
use crate::health::{CheckData, CheckResult, HealthReport, HealthStatus};

use crate::metrics;

use super::handlers;

/// OpenAPI description of every route served by [`super::create_router`].
#[derive(OpenApi)]
#[openapi(
    info(title = "Catalog Service", description = "Product catalog API"),
    paths(
        handlers::get_products,
        handlers::get_product,
        handlers::add_product,
        handlers::readiness,
        handlers::liveness
    ),
    components(schemas(Product, HealthReport, CheckResult, CheckData, HealthStatus)),
    tags(
        (name = "catalog", description = "Product catalog entries"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Response {
    let start = Instant::now();
    let response = Json(ApiDoc::openapi()).into_response();
    metrics::record_http_latency(start, "openapi", response.status().as_u16());
    response
}
