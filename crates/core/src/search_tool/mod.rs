//! Web search tool used by the research assistant.

mod duckduckgo;

pub use duckduckgo::DuckDuckGoSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a web search.
#[derive(Debug, Error)]
pub enum SearchToolError {
    #[error("Search HTTP error: {0}")]
    Http(String),

    #[error("Search API error: {0}")]
    Api(String),
}

/// A web search returning a plain-text digest of findings.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Returns the name of this tool.
    fn name(&self) -> &str;

    /// Runs a query. An empty string means nothing relevant was found.
    async fn search(&self, query: &str) -> Result<String, SearchToolError>;
}

/// Search tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchToolConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// How many related topics to include in a digest.
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,
}

fn default_base_url() -> String {
    "https://api.duckduckgo.com".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_max_topics() -> usize {
    5
}

impl Default for SearchToolConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_topics: default_max_topics(),
        }
    }
}
