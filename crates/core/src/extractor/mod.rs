//! Structured page extraction.
//!
//! An [`Extractor`] takes a URL, a JSON schema and free-form instructions and
//! returns a JSON document matching the schema. [`LlmPageExtractor`] does this
//! by loading the page in its own browser session and asking the LLM to read
//! the visible text.

mod llm_page;

pub use llm_page::LlmPageExtractor;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::browser::BrowserError;
use crate::llm::LlmError;

/// Errors from structured extraction.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model replied, but not with a usable document.
    #[error("Malformed extraction result: {0}")]
    Malformed(String),
}

/// Extracts structured data from a web page.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Reads `url` and returns a JSON value following `schema`.
    async fn extract(
        &self,
        url: &str,
        schema: &Value,
        instructions: &str,
    ) -> Result<Value, ExtractorError>;
}
