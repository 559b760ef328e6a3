//! Run submission handler.

use axum::{extract::State, Json};
use tracing::debug;

use crate::engine::{RunRequest, RunSummary};
use crate::error::AppError;
use crate::state::AppState;

/// Submit a workflow run.
///
/// POST /api/runs
///
/// Malformed requests are rejected up front with a validation error.
/// Anything past validation produces a full run summary, including
/// failed runs (missing workflow, engine fault): `success` in the body
/// reflects the run status.
pub async fn submit_run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunSummary>, AppError> {
    request.validate().map_err(AppError::Validation)?;

    debug!(
        workflow_id = %request.workflow_id,
        user_id = %request.user_id,
        trigger = %request.trigger,
        "Run submitted"
    );

    let summary = state.engine.run(request).await;

    Ok(Json(summary))
}
