//! Mock search tool for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::search_tool::{SearchTool, SearchToolError};

/// Mock implementation of the SearchTool trait.
#[derive(Debug, Clone)]
pub struct MockSearchTool {
    result: Arc<RwLock<Result<String, String>>>,
    queries: Arc<RwLock<Vec<String>>>,
}

impl Default for MockSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchTool {
    pub fn new() -> Self {
        Self {
            result: Arc::new(RwLock::new(Ok(String::new()))),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Digest returned for every query.
    pub async fn set_result(&self, digest: impl Into<String>) {
        *self.result.write().await = Ok(digest.into());
    }

    /// Makes every query fail.
    pub async fn set_failure(&self, message: impl Into<String>) {
        *self.result.write().await = Err(message.into());
    }

    pub async fn queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl SearchTool for MockSearchTool {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<String, SearchToolError> {
        self.queries.write().await.push(query.to_string());
        self.result
            .read()
            .await
            .clone()
            .map_err(SearchToolError::Http)
    }
}
