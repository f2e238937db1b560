//! Worker pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    /// Maximum pipelines running at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum submissions waiting for a free worker.
    /// Submissions beyond this are rejected.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long a queued submission waits for a worker before failing (seconds).
    #[serde(default = "default_queue_timeout")]
    pub queue_timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    32
}

fn default_queue_timeout() -> u64 {
    300 // 5 minutes
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
            queue_timeout_secs: default_queue_timeout(),
        }
    }
}

impl WorkerPoolConfig {
    /// Running plus waiting submissions the pool admits.
    pub fn total_capacity(&self) -> usize {
        self.max_concurrent.saturating_add(self.queue_capacity)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_timeout_secs)
    }
}
