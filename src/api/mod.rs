//! HTTP API module for catalog, health, and API description endpoints.

pub mod handlers;
pub mod openapi;
pub mod routes;

pub use handlers::AppState;
pub use openapi::ApiDoc;
pub use routes::create_router;
