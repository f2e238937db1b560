//! Trait definitions for browser automation.

use async_trait::async_trait;
use std::time::Duration;

use super::error::BrowserError;

/// Opaque handle to an element in the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Factory for browser sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Returns the name of this driver implementation.
    fn name(&self) -> &str;

    /// Starts a fresh browser session.
    ///
    /// The caller owns the session and must call [`BrowserSession::close`]
    /// on every exit path.
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// A live browser session.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Loads a URL and waits for the navigation to commit.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// URL of the current page, after any redirects or form submits.
    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Polls for the first element matching a CSS selector.
    ///
    /// Fails with [`BrowserError::ElementNotFound`] once `timeout` elapses.
    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementRef, BrowserError>;

    /// All elements currently matching a CSS selector (possibly none).
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>, BrowserError>;

    /// Clears an input field.
    async fn clear(&self, element: &ElementRef) -> Result<(), BrowserError>;

    /// Types text into an element.
    async fn type_text(&self, element: &ElementRef, text: &str) -> Result<(), BrowserError>;

    /// Sends the Enter key to an element.
    async fn press_enter(&self, element: &ElementRef) -> Result<(), BrowserError>;

    /// Clicks an element.
    async fn click(&self, element: &ElementRef) -> Result<(), BrowserError>;

    /// Reads an attribute; `None` when the element lacks it.
    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Visible text of the whole page.
    async fn page_text(&self) -> Result<String, BrowserError>;

    /// Waits without touching the page.
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Ends the session and releases the browser.
    async fn close(&self) -> Result<(), BrowserError>;
}
