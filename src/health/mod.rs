//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health/liveness
//!     → registry.rs (run every registered procedure with a timeout)
//!     → aggregate: UP only if every procedure reports UP
//!
//! Store procedure (store.rs):
//!     ping the catalog store → UP on success, DOWN on error
//! ```

pub mod registry;
pub mod store;

pub use registry::{CheckData, CheckResult, HealthRegistry, HealthReport, HealthStatus};
pub use store::store_check;
