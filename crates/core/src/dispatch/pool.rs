//! Bounded worker pool implementation.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::task::{SearchKind, TaskError, TaskState, TaskStore};

use super::config::WorkerPoolConfig;
use super::types::{JobFuture, PoolStatus};

/// Error type for dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Every worker is busy and the wait queue is full.
    #[error("Worker queue is full ({capacity} tasks in flight), try again later")]
    QueueFull { capacity: usize },

    /// Pool has been shut down.
    #[error("Worker pool is not running")]
    NotRunning,
}

/// Tracks statistics for the pool.
struct PoolStats {
    /// Admitted submissions not yet finished (active + queued).
    inflight: AtomicU64,
    active: AtomicU64,
    queued: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
    total_rejected: AtomicU64,
}

impl Default for PoolStats {
    fn default() -> Self {
        Self {
            inflight: AtomicU64::new(0),
            active: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            total_completed: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
        }
    }
}

impl PoolStats {
    fn to_status(&self, running: bool, config: &WorkerPoolConfig) -> PoolStatus {
        PoolStatus {
            running,
            max_concurrent: config.max_concurrent,
            queue_capacity: config.queue_capacity,
            active: self.active.load(Ordering::Relaxed) as usize,
            queued: self.queued.load(Ordering::Relaxed) as usize,
            total_completed: self.total_completed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Everything a spawned worker needs, cloned out of the pool.
#[derive(Clone)]
struct WorkerContext {
    store: Arc<dyn TaskStore>,
    permits: Arc<Semaphore>,
    stats: Arc<PoolStats>,
    queue_timeout: Duration,
}

/// Runs submitted pipelines on background tokio tasks.
///
/// At most `max_concurrent` jobs run at once. Up to `queue_capacity` more
/// wait for a permit, each for at most `queue_timeout_secs`. Anything beyond
/// that is rejected at submission time.
pub struct WorkerPool {
    config: WorkerPoolConfig,
    ctx: WorkerContext,
    running: AtomicBool,
}

impl WorkerPool {
    /// Creates a running pool that records task outcomes in `store`.
    pub fn new(config: WorkerPoolConfig, store: Arc<dyn TaskStore>) -> Self {
        let ctx = WorkerContext {
            store,
            permits: Arc::new(Semaphore::new(config.max_concurrent)),
            stats: Arc::new(PoolStats::default()),
            queue_timeout: config.queue_timeout(),
        };

        Self {
            config,
            ctx,
            running: AtomicBool::new(true),
        }
    }

    /// Overrides how long queued submissions wait for a worker.
    pub fn with_queue_timeout(mut self, timeout: Duration) -> Self {
        self.ctx.queue_timeout = timeout;
        self
    }

    /// Hands a job to the pool and returns immediately.
    ///
    /// The task must already exist in the store in the `pending` state. The
    /// pool moves it to `processing` when a worker picks it up and then
    /// writes exactly one terminal state, whatever the job does.
    pub fn submit(&self, task_id: &str, kind: SearchKind, job: JobFuture) -> Result<(), DispatchError> {
        if !self.running.load(Ordering::SeqCst) {
            self.reject("not_running");
            return Err(DispatchError::NotRunning);
        }

        let capacity = self.config.total_capacity() as u64;
        let admitted = self
            .ctx
            .stats
            .inflight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < capacity).then_some(n + 1)
            });
        if admitted.is_err() {
            self.reject("queue_full");
            warn!(task_id, kind = %kind, capacity, "Worker queue full, rejecting task");
            return Err(DispatchError::QueueFull {
                capacity: capacity as usize,
            });
        }

        self.ctx.stats.queued.fetch_add(1, Ordering::SeqCst);
        metrics::WORKERS_QUEUED.inc();
        debug!(task_id, kind = %kind, "Task queued");

        let ctx = self.ctx.clone();
        let task_id = task_id.to_string();
        tokio::spawn(async move {
            run_worker(ctx, task_id, kind, job).await;
        });

        Ok(())
    }

    /// Stops accepting submissions.
    ///
    /// Running jobs finish normally. Jobs still waiting for a worker are
    /// failed, since no permit will be handed out any more.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.ctx.permits.close();
            info!("Worker pool shut down");
        }
    }

    /// Whether the pool accepts submissions.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current pool statistics.
    pub fn status(&self) -> PoolStatus {
        self.ctx
            .stats
            .to_status(self.is_running(), &self.config)
    }

    fn reject(&self, reason: &str) {
        self.ctx.stats.total_rejected.fetch_add(1, Ordering::Relaxed);
        metrics::DISPATCH_REJECTIONS
            .with_label_values(&[reason])
            .inc();
    }
}

/// Waits for a permit, runs the job, and records the outcome.
async fn run_worker(ctx: WorkerContext, task_id: String, kind: SearchKind, job: JobFuture) {
    let acquired = tokio::time::timeout(ctx.queue_timeout, Arc::clone(&ctx.permits).acquire_owned()).await;

    ctx.stats.queued.fetch_sub(1, Ordering::SeqCst);
    metrics::WORKERS_QUEUED.dec();

    let _permit = match acquired {
        Ok(Ok(permit)) => permit,
        Ok(Err(_closed)) => {
            finish(
                &ctx,
                &task_id,
                kind,
                TaskState::Failed {
                    error: "Worker pool shut down before the task started".to_string(),
                },
                None,
            );
            return;
        }
        Err(_elapsed) => {
            metrics::DISPATCH_REJECTIONS
                .with_label_values(&["queue_timeout"])
                .inc();
            warn!(task_id = %task_id, kind = %kind, "Timed out waiting for a worker");
            finish(
                &ctx,
                &task_id,
                kind,
                TaskState::Failed {
                    error: format!(
                        "No worker became available within {} seconds",
                        ctx.queue_timeout.as_secs_f64()
                    ),
                },
                None,
            );
            return;
        }
    };

    match ctx.store.update(&task_id, TaskState::Processing) {
        Ok(_) => {}
        Err(TaskError::NotFound(_)) => {
            // Forgotten while queued; nobody is left to read the result.
            debug!(task_id = %task_id, "Task removed before it started, skipping");
            ctx.stats.inflight.fetch_sub(1, Ordering::SeqCst);
            return;
        }
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Failed to mark task as processing");
        }
    }

    ctx.stats.active.fetch_add(1, Ordering::SeqCst);
    metrics::WORKERS_ACTIVE.inc();
    info!(task_id = %task_id, kind = %kind, "Task started");

    let started = Instant::now();

    // A nested spawn turns a panic inside the pipeline into a JoinError
    // instead of taking the worker down with it.
    let state = match tokio::spawn(job).await {
        Ok(Ok(data)) => TaskState::Completed { data },
        Ok(Err(e)) => TaskState::Failed {
            error: e.to_string(),
        },
        Err(join_err) if join_err.is_panic() => TaskState::Failed {
            error: format!("worker panicked: {}", panic_message(join_err.into_panic())),
        },
        Err(join_err) => TaskState::Failed {
            error: format!("worker aborted: {}", join_err),
        },
    };

    ctx.stats.active.fetch_sub(1, Ordering::SeqCst);
    metrics::WORKERS_ACTIVE.dec();

    finish(&ctx, &task_id, kind, state, Some(started.elapsed()));
}

/// Writes the terminal state and updates counters.
fn finish(
    ctx: &WorkerContext,
    task_id: &str,
    kind: SearchKind,
    state: TaskState,
    elapsed: Option<Duration>,
) {
    let outcome = state.state_type();
    match &state {
        TaskState::Completed { .. } => {
            ctx.stats.total_completed.fetch_add(1, Ordering::Relaxed);
            info!(task_id, kind = %kind, "Task completed");
        }
        TaskState::Failed { error } => {
            ctx.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            warn!(task_id, kind = %kind, error = %error, "Task failed");
        }
        _ => {}
    }

    metrics::TASKS_FINISHED
        .with_label_values(&[kind.as_str(), outcome])
        .inc();
    if let Some(elapsed) = elapsed {
        metrics::PIPELINE_DURATION
            .with_label_values(&[kind.as_str(), outcome])
            .observe(elapsed.as_secs_f64());
    }

    if let Err(e) = ctx.store.update(task_id, state) {
        warn!(task_id, error = %e, "Failed to record task outcome");
    }

    ctx.stats.inflight.fetch_sub(1, Ordering::SeqCst);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineError;
    use crate::task::{InMemoryTaskStore, TaskRecord};
    use std::future::Future;
    use serde_json::json;
    use tokio::sync::oneshot;

    fn job<F>(f: F) -> JobFuture
    where
        F: Future<Output = Result<serde_json::Value, PipelineError>> + Send + 'static,
    {
        Box::pin(f)
    }

    fn pool_with(config: WorkerPoolConfig) -> (WorkerPool, Arc<InMemoryTaskStore>) {
        let store = Arc::new(InMemoryTaskStore::default());
        let pool = WorkerPool::new(config, store.clone());
        (pool, store)
    }

    fn small_config(max_concurrent: usize, queue_capacity: usize) -> WorkerPoolConfig {
        WorkerPoolConfig {
            max_concurrent,
            queue_capacity,
            queue_timeout_secs: 30,
        }
    }

    async fn wait_terminal(store: &InMemoryTaskStore, id: &str) -> TaskRecord {
        for _ in 0..200 {
            let record = store.get(id).unwrap().unwrap();
            if record.state.is_terminal() {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} never finished", id);
    }

    #[tokio::test]
    async fn test_job_success_completes_task() {
        let (pool, store) = pool_with(WorkerPoolConfig::default());
        store.create("t1", SearchKind::Hotel).unwrap();

        pool.submit("t1", SearchKind::Hotel, job(async { Ok(json!({"hotels": []})) }))
            .unwrap();

        let record = wait_terminal(&store, "t1").await;
        assert_eq!(record.state.data(), Some(&json!({"hotels": []})));
        assert_eq!(pool.status().total_completed, 1);
    }

    #[tokio::test]
    async fn test_job_error_fails_task() {
        let (pool, store) = pool_with(WorkerPoolConfig::default());
        store.create("t1", SearchKind::Flight).unwrap();

        pool.submit(
            "t1",
            SearchKind::Flight,
            job(async { Err(PipelineError::Extraction("no flights".to_string())) }),
        )
        .unwrap();

        let record = wait_terminal(&store, "t1").await;
        assert!(record.state.error().unwrap().contains("no flights"));
        assert_eq!(pool.status().total_failed, 1);
    }

    #[tokio::test]
    async fn test_panic_becomes_failed() {
        let (pool, store) = pool_with(WorkerPoolConfig::default());
        store.create("t1", SearchKind::Video).unwrap();

        pool.submit(
            "t1",
            SearchKind::Video,
            job(async {
                if true {
                    panic!("selector exploded");
                }
                Ok(json!({}))
            }),
        )
        .unwrap();

        let record = wait_terminal(&store, "t1").await;
        let error = record.state.error().unwrap();
        assert!(error.starts_with("worker panicked:"));
        assert!(error.contains("selector exploded"));
    }

    #[tokio::test]
    async fn test_processing_visible_while_running() {
        let (pool, store) = pool_with(WorkerPoolConfig::default());
        store.create("t1", SearchKind::Hotel).unwrap();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        pool.submit(
            "t1",
            SearchKind::Hotel,
            job(async move {
                let _ = release_rx.await;
                Ok(json!({}))
            }),
        )
        .unwrap();

        let mut saw_processing = false;
        for _ in 0..100 {
            if store.get("t1").unwrap().unwrap().state == TaskState::Processing {
                saw_processing = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(saw_processing);
        assert_eq!(pool.status().active, 1);

        release_tx.send(()).unwrap();
        wait_terminal(&store, "t1").await;
        assert_eq!(pool.status().active, 0);
    }

    #[tokio::test]
    async fn test_queue_full_rejects() {
        let (pool, store) = pool_with(small_config(1, 1));
        let mut releases = Vec::new();

        for id in ["a", "b"] {
            store.create(id, SearchKind::Hotel).unwrap();
            let (tx, rx) = oneshot::channel::<()>();
            releases.push(tx);
            pool.submit(
                id,
                SearchKind::Hotel,
                job(async move {
                    let _ = rx.await;
                    Ok(json!({}))
                }),
            )
            .unwrap();
        }

        store.create("c", SearchKind::Hotel).unwrap();
        let err = pool
            .submit("c", SearchKind::Hotel, job(async { Ok(json!({})) }))
            .unwrap_err();
        assert!(matches!(err, DispatchError::QueueFull { capacity: 2 }));
        assert_eq!(pool.status().total_rejected, 1);

        for tx in releases {
            let _ = tx.send(());
        }
        wait_terminal(&store, "a").await;
        wait_terminal(&store, "b").await;

        // Capacity frees up once work drains.
        pool.submit("c", SearchKind::Hotel, job(async { Ok(json!({})) }))
            .unwrap();
        wait_terminal(&store, "c").await;
    }

    #[tokio::test]
    async fn test_queue_timeout_fails_waiting_task() {
        let (pool, store) = pool_with(small_config(1, 4));
        let pool = pool.with_queue_timeout(Duration::from_millis(50));
        let (release_tx, release_rx) = oneshot::channel::<()>();

        store.create("busy", SearchKind::Flight).unwrap();
        pool.submit(
            "busy",
            SearchKind::Flight,
            job(async move {
                let _ = release_rx.await;
                Ok(json!({}))
            }),
        )
        .unwrap();

        store.create("waiting", SearchKind::Flight).unwrap();
        pool.submit("waiting", SearchKind::Flight, job(async { Ok(json!({})) }))
            .unwrap();

        let record = wait_terminal(&store, "waiting").await;
        assert!(record.state.error().unwrap().contains("No worker became available"));

        release_tx.send(()).unwrap();
        let busy = wait_terminal(&store, "busy").await;
        assert!(busy.state.data().is_some());
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let (pool, store) = pool_with(small_config(2, 10));
        let running = Arc::new(AtomicU64::new(0));
        let peak = Arc::new(AtomicU64::new(0));

        for i in 0..6 {
            let id = format!("t{}", i);
            store.create(&id, SearchKind::Video).unwrap();
            let running = running.clone();
            let peak = peak.clone();
            pool.submit(
                &id,
                SearchKind::Video,
                job(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(json!({"n": i}))
                }),
            )
            .unwrap();
        }

        for i in 0..6 {
            let record = wait_terminal(&store, &format!("t{}", i)).await;
            assert_eq!(record.state.data(), Some(&json!({"n": i})));
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.status().total_completed, 6);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_work() {
        let (pool, store) = pool_with(WorkerPoolConfig::default());
        pool.shutdown();
        assert!(!pool.status().running);

        store.create("t1", SearchKind::Hotel).unwrap();
        let err = pool
            .submit("t1", SearchKind::Hotel, job(async { Ok(json!({})) }))
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotRunning));
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42u8)), "unknown panic");
    }
}
