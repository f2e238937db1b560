use std::sync::Arc;
use tripscout_core::{Config, Pipelines, SanitizedConfig, TaskStore, WorkerPool};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn TaskStore>,
    pool: Arc<WorkerPool>,
    pipelines: Pipelines,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn TaskStore>,
        pool: Arc<WorkerPool>,
        pipelines: Pipelines,
    ) -> Self {
        Self {
            config,
            store,
            pool,
            pipelines,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    pub fn pool(&self) -> &WorkerPool {
        self.pool.as_ref()
    }

    pub fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }
}
