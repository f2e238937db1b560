//! Core task data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of search a task runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Flight,
    Hotel,
    Restaurant,
    Video,
}

impl SearchKind {
    /// Stable lowercase name, used for metric labels and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Flight => "flight",
            SearchKind::Hotel => "hotel",
            SearchKind::Restaurant => "restaurant",
            SearchKind::Video => "video",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle state.
///
/// Results live inside the terminal variants, so a finished task carries
/// either its data or its error message and never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskState {
    /// Accepted, waiting for a worker.
    Pending,

    /// A worker is running the pipeline.
    Processing,

    /// Pipeline finished successfully.
    Completed {
        /// Search-kind-specific result document.
        data: Value,
    },

    /// Pipeline failed or the worker crashed.
    Failed {
        /// Human-readable failure description.
        error: String,
    },
}

impl TaskState {
    /// Returns the state type as a string.
    pub fn state_type(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Processing => "processing",
            TaskState::Completed { .. } => "completed",
            TaskState::Failed { .. } => "failed",
        }
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed { .. } | TaskState::Failed { .. })
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: &TaskState) -> bool {
        match (self, next) {
            (TaskState::Pending, TaskState::Processing) => true,
            (TaskState::Pending | TaskState::Processing, next) => next.is_terminal(),
            _ => false,
        }
    }

    /// Result data, only present once completed.
    pub fn data(&self) -> Option<&Value> {
        match self {
            TaskState::Completed { data } => Some(data),
            _ => None,
        }
    }

    /// Failure message, only present once failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            TaskState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// A tracked task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    pub id: String,
    pub kind: SearchKind,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last time a client read this record. Drives eviction order.
    pub last_accessed: DateTime<Utc>,
}

impl TaskRecord {
    /// New pending record.
    pub fn new(id: impl Into<String>, kind: SearchKind) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            state: TaskState::Pending,
            created_at: now,
            updated_at: now,
            last_accessed: now,
        }
    }
}
