//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Tasks (created, finished)
//! - Worker dispatch (active, queued, rejections)
//! - Pipelines (duration by kind)
//! - External services (LLM, browser, transcripts, search)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Task Metrics
// =============================================================================

/// Tasks created by search kind.
pub static TASKS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tripscout_tasks_created_total", "Total tasks created"),
        &["kind"],
    )
    .unwrap()
});

/// Tasks reaching a terminal state.
pub static TASKS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tripscout_tasks_finished_total", "Total tasks finished"),
        &["kind", "outcome"], // outcome: "completed", "failed"
    )
    .unwrap()
});

/// Records removed by the expiry sweeper.
pub static TASKS_EXPIRED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tripscout_tasks_expired_total",
        "Total finished tasks purged after their time-to-live",
    )
    .unwrap()
});

// =============================================================================
// Dispatch Metrics
// =============================================================================

/// Pipelines currently holding a worker permit.
pub static WORKERS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("tripscout_workers_active", "Pipelines currently running").unwrap()
});

/// Submissions waiting for a worker permit.
pub static WORKERS_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("tripscout_workers_queued", "Submissions waiting for a worker").unwrap()
});

/// Submissions rejected by the pool.
pub static DISPATCH_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tripscout_dispatch_rejections_total",
            "Total submissions rejected by the worker pool",
        ),
        &["reason"], // "queue_full", "not_running", "queue_timeout"
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Pipeline duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tripscout_pipeline_duration_seconds",
            "Duration of scrape pipelines",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["kind", "outcome"],
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tripscout_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tripscout_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tripscout_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record the outcome of an external service call.
pub fn record_external_call(service: &str, operation: &str, secs: f64, ok: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(secs);
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, if ok { "success" } else { "error" }])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Tasks
        Box::new(TASKS_CREATED.clone()),
        Box::new(TASKS_FINISHED.clone()),
        Box::new(TASKS_EXPIRED.clone()),
        // Dispatch
        Box::new(WORKERS_ACTIVE.clone()),
        Box::new(WORKERS_QUEUED.clone()),
        Box::new(DISPATCH_REJECTIONS.clone()),
        // Pipelines
        Box::new(PIPELINE_DURATION.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
