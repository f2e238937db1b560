//! Pipeline error type.

use thiserror::Error;

use crate::browser::BrowserError;
use crate::extractor::ExtractorError;
use crate::llm::LlmError;
use crate::transcript::TranscriptError;

/// Errors that abort a scrape pipeline.
///
/// The display string becomes the task's failure message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required page element never appeared, or a page failed to load.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The extracted data was missing, malformed, or incomplete.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Transcript lookup failed: {0}")]
    Transcript(#[from] TranscriptError),

    /// The browser itself misbehaved (driver unreachable, session lost).
    #[error("Browser error: {0}")]
    Browser(BrowserError),
}

impl From<BrowserError> for PipelineError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::ElementNotFound { .. } => PipelineError::Navigation(err.to_string()),
            other => PipelineError::Browser(other),
        }
    }
}

impl From<ExtractorError> for PipelineError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::Browser(e) => e.into(),
            ExtractorError::Llm(e) => PipelineError::Llm(e),
            ExtractorError::Malformed(msg) => PipelineError::Extraction(msg),
        }
    }
}
