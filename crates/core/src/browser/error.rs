//! Error types for browser automation.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving a browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Could not reach the WebDriver endpoint.
    #[error("WebDriver HTTP error: {0}")]
    Http(String),

    /// WebDriver answered with an error object.
    #[error("WebDriver error ({error}): {message}")]
    WebDriver { error: String, message: String },

    /// An element did not appear within the allowed time.
    #[error("Element '{selector}' not found within {timeout:?}")]
    ElementNotFound { selector: String, timeout: Duration },

    /// WebDriver answered with something unexpected.
    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    /// The session was already closed.
    #[error("Browser session is closed")]
    SessionClosed,
}

impl BrowserError {
    /// Whether a lookup failed only because nothing matched yet.
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, BrowserError::WebDriver { error, .. } if error == "no such element")
    }
}
