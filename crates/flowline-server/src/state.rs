//! Application state for the Flowline server.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::WorkflowEngine;

/// Backing-store reachability as reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreHealth {
    /// The store answered a probe query.
    Reachable,
    /// The store did not answer.
    Unreachable,
    /// Running against the file store, nothing to probe.
    NotConfigured,
}

impl StoreHealth {
    /// Wire label for the health payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreHealth::Reachable => "reachable",
            StoreHealth::Unreachable => "unreachable",
            StoreHealth::NotConfigured => "not_configured",
        }
    }
}

/// Shared application state passed to handlers via Axum's state.
#[derive(Clone)]
pub struct AppState {
    /// Workflow run engine
    pub engine: Arc<WorkflowEngine>,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Database connection pool (absent in file-store mode)
    pub db: Option<PgPool>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new application state.
    pub fn new(engine: Arc<WorkflowEngine>, config: AppConfig, db: Option<PgPool>) -> Self {
        Self {
            engine,
            config: Arc::new(config),
            db,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Probe the workflow store's database.
    ///
    /// A run hitting an unreachable store still gets its structured
    /// failed summary; this probe exists so operators see the outage on
    /// the health endpoint before runs start failing.
    pub async fn store_health(&self) -> StoreHealth {
        let Some(ref pool) = self.db else {
            return StoreHealth::NotConfigured;
        };

        match sqlx::query_scalar::<_, i64>("SELECT count(*) FROM flowline.workflow")
            .fetch_one(pool)
            .await
        {
            Ok(_) => StoreHealth::Reachable,
            Err(e) => {
                tracing::warn!(error = %e, "Workflow store health probe failed");
                StoreHealth::Unreachable
            }
        }
    }
}
