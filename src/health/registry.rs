//! Named health procedures and their aggregated report.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;
use utoipa::ToSchema;

/// Status reported by a procedure and by the aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HealthStatus {
    /// Procedure succeeded.
    Up,
    /// Procedure failed or timed out.
    Down,
}

impl HealthStatus {
    /// Check if status is UP.
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }
}

/// Extra detail attached to a procedure that could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckData {
    /// Always true: the procedure did not produce a status itself.
    #[serde(rename = "procedure-execution-failure")]
    pub procedure_execution_failure: bool,
    /// Why the procedure did not complete.
    pub cause: String,
}

/// Result of one named procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckResult {
    /// Procedure name.
    pub id: String,
    /// Reported status.
    pub status: HealthStatus,
    /// Failure detail, when the procedure did not complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CheckData>,
}

/// Aggregated health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    /// Individual procedure results, in registration order.
    pub checks: Vec<CheckResult>,
    /// UP only when every check is UP.
    pub outcome: HealthStatus,
}

type Procedure = Arc<dyn Fn() -> BoxFuture<'static, HealthStatus> + Send + Sync>;

/// Registry of named health procedures.
#[derive(Clone)]
pub struct HealthRegistry {
    timeout: Duration,
    procedures: Vec<(String, Procedure)>,
}

impl HealthRegistry {
    /// Create an empty registry with a per-procedure timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            procedures: Vec::new(),
        }
    }

    /// Register a procedure under `id`.
    pub fn register<F, Fut>(&mut self, id: impl Into<String>, procedure: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HealthStatus> + Send + 'static,
    {
        let procedure: Procedure = Arc::new(move || procedure().boxed());
        self.procedures.push((id.into(), procedure));
        self
    }

    /// Number of registered procedures.
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Whether no procedure is registered.
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Run every procedure concurrently and aggregate the results.
    pub async fn run(&self) -> HealthReport {
        let checks = join_all(self.procedures.iter().map(|(id, procedure)| {
            let id = id.clone();
            let fut = procedure();
            let timeout = self.timeout;
            async move {
                match tokio::time::timeout(timeout, fut).await {
                    Ok(status) => CheckResult {
                        id,
                        status,
                        data: None,
                    },
                    Err(_) => {
                        warn!(check = %id, timeout_ms = timeout.as_millis() as u64, "Health procedure timed out");
                        CheckResult {
                            id,
                            status: HealthStatus::Down,
                            data: Some(CheckData {
                                procedure_execution_failure: true,
                                cause: "Timeout".to_string(),
                            }),
                        }
                    }
                }
            }
        }))
        .await;

        let outcome = if checks.iter().all(|c| c.status.is_up()) {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        HealthReport { checks, outcome }
    }
}

impl std::fmt::Debug for HealthRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthRegistry")
            .field("timeout", &self.timeout)
            .field(
                "procedures",
                &self.procedures.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
