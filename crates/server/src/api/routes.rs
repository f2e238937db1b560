use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, search, tasks};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Searches
        .route("/search_flights", post(search::search_flights))
        .route("/search_hotels", post(search::search_hotels))
        .route("/search_restaurants", post(search::search_restaurants))
        .route("/search_youtube", post(search::search_videos))
        // Task status
        .route(
            "/task_status/{task_id}",
            get(tasks::get_task_status).delete(tasks::forget_task),
        )
        // Operations
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/workers/status", get(handlers::workers_status))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
