use super::{types::Config, ConfigError};
use crate::llm::LlmProvider;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Worker pool has at least one worker
/// - Task store can hold every task the pool may have in flight, and sweeps
///   on a non-zero interval
/// - LLM model is set, and hosted providers have a key or custom base
/// - Browser timeouts are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.workers.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "workers.max_concurrent must be at least 1".to_string(),
        ));
    }

    if config.workers.queue_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "workers.queue_timeout_secs cannot be 0".to_string(),
        ));
    }

    let pool_capacity = config.workers.total_capacity();
    if config.task_store.max_entries < pool_capacity {
        return Err(ConfigError::ValidationError(format!(
            "task_store.max_entries ({}) must be at least workers.max_concurrent + workers.queue_capacity ({})",
            config.task_store.max_entries, pool_capacity
        )));
    }

    if config.task_store.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "task_store.sweep_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "llm.model cannot be empty".to_string(),
        ));
    }

    if config.llm.provider != LlmProvider::Ollama
        && config.llm.api_key.is_none()
        && config.llm.api_base.is_none()
    {
        return Err(ConfigError::ValidationError(format!(
            "llm provider {:?} requires api_key or api_base",
            config.llm.provider
        )));
    }

    if config.browser.element_timeout_ms == 0 || config.browser.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "browser.element_timeout_ms and browser.poll_interval_ms must be positive"
                .to_string(),
        ));
    }

    if config.sites.video_count == 0 || config.sites.hotel_count == 0 {
        return Err(ConfigError::ValidationError(
            "sites.video_count and sites.hotel_count must be positive".to_string(),
        ));
    }

    Ok(())
}
