use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tripscout_core::{PoolStatus, SanitizedConfig};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Worker pool statistics plus the number of stored task records.
#[derive(Debug, Serialize)]
pub struct WorkersStatusResponse {
    #[serde(flatten)]
    pub pool: PoolStatus,
    pub tasks_stored: usize,
}

pub async fn workers_status(State(state): State<Arc<AppState>>) -> Json<WorkersStatusResponse> {
    Json(WorkersStatusResponse {
        pool: state.pool().status(),
        tasks_stored: state.store().len(),
    })
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
