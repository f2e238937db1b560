use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};
use tripscout_core::{TaskError, TaskState};

use super::{api_error, ApiError};
use crate::state::AppState;

const NOT_FOUND: &str = "Task not found";

/// Current state of a task: `{"status": ...}` plus `data` or `error` once
/// it has finished.
pub async fn get_task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskState>, ApiError> {
    match state.store().get(&task_id) {
        Ok(Some(record)) => Ok(Json(record.state)),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, NOT_FOUND)),
        Err(e) => {
            error!(task_id = %task_id, error = %e, "Failed to read task");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Drops a task record. A job still running keeps running, but its result
/// is discarded.
pub async fn forget_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.store().forget(&task_id) {
        Ok(_) => {
            info!(task_id = %task_id, "Task forgotten");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(TaskError::NotFound(_)) => Err(api_error(StatusCode::NOT_FOUND, NOT_FOUND)),
        Err(e) => {
            error!(task_id = %task_id, error = %e, "Failed to forget task");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
