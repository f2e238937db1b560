//! Worker pool types.

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::pipeline::PipelineError;

/// A unit of work submitted to the pool: a pipeline run producing the
/// task's result document.
pub type JobFuture = BoxFuture<'static, Result<Value, PipelineError>>;

/// Snapshot of worker pool statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    /// Whether the pool accepts new submissions.
    pub running: bool,
    pub max_concurrent: usize,
    pub queue_capacity: usize,
    /// Pipelines currently running.
    pub active: usize,
    /// Submissions waiting for a worker.
    pub queued: usize,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_rejected: u64,
}
