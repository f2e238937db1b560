//! Task tracking for asynchronous search requests.
//!
//! Every accepted search becomes a task identified by an opaque id. The
//! task moves `pending -> processing -> completed | failed` and is polled by
//! clients until it reaches a terminal state.

mod config;
mod memory_store;
mod store;
mod types;

pub use config::TaskStoreConfig;
pub use memory_store::InMemoryTaskStore;
pub use store::{TaskError, TaskStore};
pub use types::{SearchKind, TaskRecord, TaskState};
