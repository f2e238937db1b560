//! Mock extractor for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::extractor::{Extractor, ExtractorError};

/// A recorded extraction call.
#[derive(Debug, Clone)]
pub struct RecordedExtraction {
    pub url: String,
    pub schema: Value,
    pub instructions: String,
}

/// Mock implementation of the Extractor trait.
///
/// Results are served in push order; an empty queue yields a malformed
/// result error. Results registered for a URL fragment take precedence and
/// are served for every matching URL. An optional delay holds every call open, which keeps a
/// worker busy for as long as a test needs.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    results: Arc<RwLock<VecDeque<Result<Value, String>>>>,
    by_url: Arc<RwLock<Vec<(String, Value)>>>,
    calls: Arc<RwLock<Vec<RecordedExtraction>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_result(&self, value: Value) {
        self.results.write().await.push_back(Ok(value));
    }

    pub async fn push_error(&self, message: impl Into<String>) {
        self.results.write().await.push_back(Err(message.into()));
    }

    /// Serves `value` whenever the extracted URL contains `fragment`.
    pub async fn set_result_for_url(&self, fragment: impl Into<String>, value: Value) {
        self.by_url.write().await.push((fragment.into(), value));
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedExtraction> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(
        &self,
        url: &str,
        schema: &Value,
        instructions: &str,
    ) -> Result<Value, ExtractorError> {
        self.calls.write().await.push(RecordedExtraction {
            url: url.to_string(),
            schema: schema.clone(),
            instructions: instructions.to_string(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let keyed = self
            .by_url
            .read()
            .await
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, value)| value.clone());
        if let Some(value) = keyed {
            return Ok(value);
        }

        match self.results.write().await.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ExtractorError::Malformed(message)),
            None => Err(ExtractorError::Malformed("no mock result queued".to_string())),
        }
    }
}
