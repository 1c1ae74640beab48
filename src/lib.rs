//! Product catalog HTTP service.
//!
//! Lists, fetches, and creates product catalog entries held by an external
//! data store. Reads go through a circuit breaker so a failing store is
//! answered with a fast 503 instead of piling up slow requests, and a
//! liveness endpoint reports whether the store still answers pings.
//!
//! # Endpoints
//!
//! ```text
//! GET  /products            → circuit breaker → store.get_products
//! GET  /product/{itemId}    → circuit breaker → store.get_product
//! POST /product             → store.add_product
//! GET  /health/readiness    → "OK"
//! GET  /health/liveness     → health registry → store.ping
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`catalog`]: Product type and data store clients
//! - [`resilience`]: Circuit breaker
//! - [`health`]: Health procedure registry
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod resilience;
pub mod utils;

pub use config::Config;
pub use error::{CatalogError, Result};
