//! Background worker dispatch.
//!
//! The [`WorkerPool`] runs scrape pipelines off the request path. It caps how
//! many pipelines (and therefore browser sessions) run at once, bounds how
//! many submissions may wait, and guarantees every admitted task ends in
//! exactly one terminal state.

mod config;
mod pool;
mod types;

pub use config::WorkerPoolConfig;
pub use pool::{DispatchError, WorkerPool};
pub use types::{JobFuture, PoolStatus};
