//! In-memory task store with TTL expiry and LRU eviction.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::config::TaskStoreConfig;
use super::store::{TaskError, TaskStore};
use super::types::{SearchKind, TaskRecord, TaskState};

/// Task store backed by a `HashMap` behind a single lock.
///
/// Each operation takes the lock exactly once, so updates are atomic with
/// respect to readers.
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, TaskRecord>>,
    config: TaskStoreConfig,
}

impl InMemoryTaskStore {
    pub fn new(config: TaskStoreConfig) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.config.ttl_secs).unwrap_or(i64::MAX))
    }

    /// Purge finished records whose last update is older than the TTL, as
    /// seen from `now`.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize, TaskError> {
        let ttl = self.ttl();
        let mut tasks = self.tasks.write().map_err(|_| TaskError::Poisoned)?;
        let before = tasks.len();
        tasks.retain(|_, record| {
            !(record.state.is_terminal()
                && now.signed_duration_since(record.updated_at) > ttl)
        });
        let removed = before - tasks.len();
        if removed > 0 {
            debug!(removed, remaining = tasks.len(), "Purged expired tasks");
        }
        Ok(removed)
    }

    /// Remove the least recently accessed finished record.
    fn evict_one(tasks: &mut HashMap<String, TaskRecord>) -> bool {
        let victim = tasks
            .values()
            .filter(|r| r.state.is_terminal())
            .min_by_key(|r| r.last_accessed)
            .map(|r| r.id.clone());

        match victim {
            Some(id) => {
                debug!(task_id = %id, "Evicting least recently used task");
                tasks.remove(&id);
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new(TaskStoreConfig::default())
    }
}

impl TaskStore for InMemoryTaskStore {
    fn create(&self, id: &str, kind: SearchKind) -> Result<TaskRecord, TaskError> {
        let mut tasks = self.tasks.write().map_err(|_| TaskError::Poisoned)?;

        if tasks.contains_key(id) {
            return Err(TaskError::AlreadyExists(id.to_string()));
        }

        if tasks.len() >= self.config.max_entries && !Self::evict_one(&mut tasks) {
            return Err(TaskError::CapacityExceeded(tasks.len()));
        }

        let record = TaskRecord::new(id, kind);
        tasks.insert(id.to_string(), record.clone());
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<Option<TaskRecord>, TaskError> {
        // Write lock: reading refreshes the access time used for eviction.
        let mut tasks = self.tasks.write().map_err(|_| TaskError::Poisoned)?;
        Ok(tasks.get_mut(id).map(|record| {
            record.last_accessed = Utc::now();
            record.clone()
        }))
    }

    fn update(&self, id: &str, state: TaskState) -> Result<TaskRecord, TaskError> {
        let mut tasks = self.tasks.write().map_err(|_| TaskError::Poisoned)?;
        let record = tasks
            .get_mut(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        if !record.state.can_transition_to(&state) {
            return Err(TaskError::InvalidTransition {
                task_id: id.to_string(),
                from: record.state.state_type().to_string(),
                to: state.state_type().to_string(),
            });
        }

        record.state = state;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn forget(&self, id: &str) -> Result<TaskRecord, TaskError> {
        let mut tasks = self.tasks.write().map_err(|_| TaskError::Poisoned)?;
        tasks
            .remove(id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    fn purge_expired(&self) -> Result<usize, TaskError> {
        self.purge_expired_at(Utc::now())
    }

    fn len(&self) -> usize {
        self.tasks.read().map(|t| t.len()).unwrap_or(0)
    }
}
