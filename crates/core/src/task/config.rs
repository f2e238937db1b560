//! Task store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the in-memory task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStoreConfig {
    /// How long a finished task stays queryable (seconds).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of records kept at once.
    /// When full, the least recently accessed finished task is evicted.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// How often the background sweeper purges expired records (seconds).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_ttl() -> u64 {
    3600 // 1 hour
}

fn default_max_entries() -> usize {
    10_000
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for TaskStoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl TaskStoreConfig {
    /// Sets the time-to-live for finished tasks.
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Sets the maximum number of stored records.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}
