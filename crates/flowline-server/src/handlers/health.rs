//! Health check handlers.

use axum::{extract::State, Json};
use serde_json::json;

use crate::state::AppState;

/// Basic liveness probe.
///
/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Detailed health including workflow-store reachability.
///
/// GET /api/health
pub async fn api_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.store_health().await;

    Json(json!({
        "status": "ok",
        "server": state.config.server_name,
        "uptime_seconds": state.uptime_seconds(),
        "workflow_store": store.as_str(),
    }))
}
