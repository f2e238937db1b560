//! HTTP task API for travel searches.
//!
//! Search endpoints validate a request, register a pending task and hand the
//! matching pipeline to the worker pool. Clients poll `/task_status/{id}`
//! until the task completes or fails.

pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::AppState;
