use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::browser::BrowserConfig;
use crate::dispatch::WorkerPoolConfig;
use crate::llm::{LlmConfig, LlmProvider};
use crate::pipeline::SitesConfig;
use crate::search_tool::SearchToolConfig;
use crate::task::TaskStoreConfig;
use crate::transcript::TranscriptConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workers: WorkerPoolConfig,
    #[serde(default)]
    pub task_store: TaskStoreConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub sites: SitesConfig,
    #[serde(default)]
    pub transcripts: TranscriptConfig,
    #[serde(default)]
    pub search_tool: SearchToolConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5000
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub workers: WorkerPoolConfig,
    pub task_store: TaskStoreConfig,
    pub llm: SanitizedLlmConfig,
    pub browser: BrowserConfig,
    pub sites: SitesConfig,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            workers: config.workers.clone(),
            task_store: config.task_store.clone(),
            llm: SanitizedLlmConfig {
                provider: config.llm.provider.clone(),
                model: config.llm.model.clone(),
                api_base: config.llm.api_base.clone(),
                api_key_configured: config
                    .llm
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            browser: config.browser.clone(),
            sites: config.sites.clone(),
        }
    }
}
