//! Task storage trait and errors.

use thiserror::Error;

use super::types::{SearchKind, TaskRecord, TaskState};

/// Error type for task store operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task not found.
    #[error("Task not found: {0}")]
    NotFound(String),

    /// A task with this id already exists.
    #[error("Task already exists: {0}")]
    AlreadyExists(String),

    /// The requested state change is not allowed from the current state.
    #[error("Cannot move task {task_id} from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: String,
        to: String,
    },

    /// Store is full and nothing can be evicted.
    #[error("Task store is full ({0} unfinished tasks)")]
    CapacityExceeded(usize),

    /// Another thread panicked while holding the store lock.
    #[error("Task store lock poisoned")]
    Poisoned,
}

/// Trait for task storage backends.
///
/// Every method is atomic with respect to concurrent callers: a reader never
/// observes a record halfway through an update.
pub trait TaskStore: Send + Sync {
    /// Register a new pending task. Never overwrites an existing id.
    fn create(&self, id: &str, kind: SearchKind) -> Result<TaskRecord, TaskError>;

    /// Get a snapshot of a task by id.
    fn get(&self, id: &str) -> Result<Option<TaskRecord>, TaskError>;

    /// Move a task to a new state. Terminal states are written exactly once.
    fn update(&self, id: &str, state: TaskState) -> Result<TaskRecord, TaskError>;

    /// Remove a task. Returns the removed record.
    fn forget(&self, id: &str) -> Result<TaskRecord, TaskError>;

    /// Drop finished tasks older than the configured time-to-live.
    /// Returns how many records were removed.
    fn purge_expired(&self) -> Result<usize, TaskError>;

    /// Number of records currently held.
    fn len(&self) -> usize;

    /// Whether the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
