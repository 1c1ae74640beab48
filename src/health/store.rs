//! Health procedure backed by a store ping.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use crate::catalog::CatalogStore;
use crate::metrics::StoreTimer;

use super::registry::HealthStatus;

/// Build a procedure that pings `store`: UP on success, DOWN on error.
pub fn store_check(
    store: Arc<dyn CatalogStore>,
) -> impl Fn() -> BoxFuture<'static, HealthStatus> + Send + Sync + 'static {
    move || {
        let store = store.clone();
        async move {
            let _timer = StoreTimer::new("ping");
            match store.ping().await {
                Ok(()) => HealthStatus::Up,
                Err(e) => {
                    warn!(store = store.kind(), error = %e, "Store ping failed");
                    HealthStatus::Down
                }
            }
        }
        .boxed()
    }
}
