//! Mock LLM client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock implementation of the LlmClient trait.
///
/// Replies are served in the order they were pushed. When the queue is
/// empty the default reply is used, if one is set; otherwise the call fails.
///
/// # Example
///
/// ```rust,ignore
/// let llm = MockLlm::new();
/// llm.push_reply("Best street food in Bangkok").await;
/// llm.push_reply("Here is what the reviewers say...").await;
/// ```
#[derive(Debug, Clone)]
pub struct MockLlm {
    replies: Arc<RwLock<VecDeque<Result<String, String>>>>,
    default_reply: Arc<RwLock<Option<String>>>,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(RwLock::new(VecDeque::new())),
            default_reply: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a successful reply.
    pub async fn push_reply(&self, text: impl Into<String>) {
        self.replies.write().await.push_back(Ok(text.into()));
    }

    /// Queue a failing call.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.replies.write().await.push_back(Err(message.into()));
    }

    /// Reply used once the queue runs dry.
    pub async fn set_default_reply(&self, text: impl Into<String>) {
        *self.default_reply.write().await = Some(text.into());
    }

    /// All requests received so far.
    pub async fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().await.clone()
    }

    /// Prompts of all requests received so far.
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.write().await.push(request);

        let next = self.replies.write().await.pop_front();
        let reply = match next {
            Some(reply) => reply,
            None => self
                .default_reply
                .read()
                .await
                .clone()
                .ok_or_else(|| "no mock reply queued".to_string()),
        };

        match reply {
            Ok(text) => Ok(CompletionResponse {
                text,
                usage: LlmUsage::default(),
                model: "mock-model".to_string(),
            }),
            Err(message) => Err(LlmError::Api {
                status: 500,
                message,
            }),
        }
    }
}
