//! Search endpoints: validate, record a pending task, hand the pipeline to
//! the worker pool.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};
use tripscout_core::{
    into_job, metrics as core_metrics, FlightSearchRequest, HotelSearchRequest,
    RestaurantSearchRequest, SearchPipeline, TaskError, ValidationError, VideoSearchRequest,
};
use uuid::Uuid;

use super::{api_error, ApiError};
use crate::state::AppState;

/// Response for an accepted search.
#[derive(Debug, Serialize)]
pub struct TaskAcceptedResponse {
    pub task_id: String,
    pub status: &'static str,
}

type SearchResult = Result<Json<TaskAcceptedResponse>, ApiError>;

pub async fn search_flights(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlightSearchRequest>, JsonRejection>,
) -> SearchResult {
    let request = accept(payload, FlightSearchRequest::validated)?;
    let pipeline = state.pipelines().flight.clone();
    enqueue(&state, pipeline, request)
}

pub async fn search_hotels(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HotelSearchRequest>, JsonRejection>,
) -> SearchResult {
    let request = accept(payload, HotelSearchRequest::validated)?;
    let pipeline = state.pipelines().hotel.clone();
    enqueue(&state, pipeline, request)
}

pub async fn search_restaurants(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RestaurantSearchRequest>, JsonRejection>,
) -> SearchResult {
    let request = accept(payload, RestaurantSearchRequest::validated)?;
    let pipeline = state.pipelines().restaurant.clone();
    enqueue(&state, pipeline, request)
}

pub async fn search_videos(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoSearchRequest>, JsonRejection>,
) -> SearchResult {
    let request = accept(payload, VideoSearchRequest::validated)?;
    let pipeline = state.pipelines().video.clone();
    enqueue(&state, pipeline, request)
}

/// Unwraps the JSON body and validates it.
///
/// A body that does not parse as JSON is rejected with the extractor's own
/// message. Absent fields deserialize as empty and fail validation.
fn accept<R>(
    payload: Result<Json<R>, JsonRejection>,
    validate: fn(R) -> Result<R, ValidationError>,
) -> Result<R, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected search body");
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    validate(request).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Creates the pending record and submits the pipeline run.
///
/// If the pool refuses the job the record is dropped again, so a rejected
/// request never leaves a task behind.
fn enqueue<P>(state: &AppState, pipeline: Arc<P>, request: P::Request) -> SearchResult
where
    P: SearchPipeline + 'static,
{
    let kind = pipeline.kind();
    let task_id = Uuid::new_v4().to_string();

    state.store().create(&task_id, kind).map_err(|e| {
        error!(task_id = %task_id, error = %e, "Failed to create task");
        let status = match e {
            TaskError::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e.to_string())
    })?;

    if let Err(e) = state
        .pool()
        .submit(&task_id, kind, into_job(pipeline, request))
    {
        if let Err(forget_err) = state.store().forget(&task_id) {
            debug!(task_id = %task_id, error = %forget_err, "Rejected task already gone");
        }
        return Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
    }

    core_metrics::TASKS_CREATED
        .with_label_values(&[kind.as_str()])
        .inc();
    info!(task_id = %task_id, kind = %kind, "Task accepted");

    Ok(Json(TaskAcceptedResponse {
        task_id,
        status: "pending",
    }))
}
