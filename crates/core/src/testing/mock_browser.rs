//! Mock browser for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::browser::{BrowserDriver, BrowserError, BrowserSession, ElementRef};

/// A browser interaction recorded for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    Navigate(String),
    Wait(String),
    Clear(String),
    Type { selector: String, text: String },
    PressEnter(String),
    Click(String),
    Close,
}

#[derive(Debug, Default)]
struct MockBrowserState {
    page_text: String,
    current_url: Option<String>,
    last_navigation: Option<String>,
    missing: Vec<String>,
    elements: HashMap<String, Vec<HashMap<String, String>>>,
    navigation_error: Option<String>,
    navigation_panic: Option<String>,
    open_error: Option<String>,
    actions: Vec<BrowserAction>,
    sessions_opened: usize,
    sessions_closed: usize,
}

/// Mock implementation of the BrowserDriver trait.
///
/// Every selector resolves to an element unless it was marked missing.
/// `find_all` returns the elements registered for the exact selector.
/// All sessions share one state, so assertions can be made on the driver.
#[derive(Debug, Clone, Default)]
pub struct MockBrowser {
    state: Arc<RwLock<MockBrowserState>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text returned by `page_text`.
    pub async fn set_page_text(&self, text: impl Into<String>) {
        self.state.write().await.page_text = text.into();
    }

    /// URL returned by `current_url`. Defaults to the last navigated URL.
    pub async fn set_current_url(&self, url: impl Into<String>) {
        self.state.write().await.current_url = Some(url.into());
    }

    /// Any selector containing `fragment` will never be found.
    pub async fn set_missing(&self, fragment: impl Into<String>) {
        self.state.write().await.missing.push(fragment.into());
    }

    /// Registers elements for `selector`, each carrying `attribute` with one
    /// of `values`.
    pub async fn set_elements(&self, selector: &str, attribute: &str, values: &[&str]) {
        let elements = values
            .iter()
            .map(|v| HashMap::from([(attribute.to_string(), v.to_string())]))
            .collect();
        self.state
            .write()
            .await
            .elements
            .insert(selector.to_string(), elements);
    }

    /// Makes every navigation fail.
    pub async fn fail_navigation(&self, message: impl Into<String>) {
        self.state.write().await.navigation_error = Some(message.into());
    }

    /// Makes every navigation panic, as a crashing driver would.
    pub async fn panic_on_navigation(&self, message: impl Into<String>) {
        self.state.write().await.navigation_panic = Some(message.into());
    }

    /// Makes opening a session fail.
    pub async fn fail_open(&self, message: impl Into<String>) {
        self.state.write().await.open_error = Some(message.into());
    }

    pub async fn actions(&self) -> Vec<BrowserAction> {
        self.state.read().await.actions.clone()
    }

    /// URLs passed to `navigate`, in order.
    pub async fn navigations(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .actions
            .iter()
            .filter_map(|a| match a {
                BrowserAction::Navigate(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn sessions_opened(&self) -> usize {
        self.state.read().await.sessions_opened
    }

    pub async fn sessions_closed(&self) -> usize {
        self.state.read().await.sessions_closed
    }
}

#[async_trait]
impl BrowserDriver for MockBrowser {
    fn name(&self) -> &str {
        "mock"
    }

    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let mut state = self.state.write().await;
        if let Some(message) = &state.open_error {
            return Err(BrowserError::Http(message.clone()));
        }
        state.sessions_opened += 1;
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockSession {
    state: Arc<RwLock<MockBrowserState>>,
}

/// Element ids encode `selector#index` so attributes can be looked up.
fn element_id(selector: &str, index: usize) -> ElementRef {
    ElementRef(format!("{}#{}", selector, index))
}

fn split_element(element: &ElementRef) -> (&str, usize) {
    match element.id().rsplit_once('#') {
        Some((selector, idx)) => (selector, idx.parse().unwrap_or(0)),
        None => (element.id(), 0),
    }
}

impl MockSession {
    async fn record(&self, action: BrowserAction) {
        self.state.write().await.actions.push(action);
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.write().await;
        state.actions.push(BrowserAction::Navigate(url.to_string()));
        if let Some(message) = state.navigation_panic.clone() {
            drop(state);
            panic!("{}", message);
        }
        if let Some(message) = &state.navigation_error {
            return Err(BrowserError::Http(message.clone()));
        }
        state.last_navigation = Some(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let state = self.state.read().await;
        Ok(state
            .current_url
            .clone()
            .or_else(|| state.last_navigation.clone())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementRef, BrowserError> {
        self.record(BrowserAction::Wait(selector.to_string())).await;
        let state = self.state.read().await;
        if state.missing.iter().any(|m| selector.contains(m.as_str())) {
            return Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
                timeout,
            });
        }
        Ok(element_id(selector, 0))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>, BrowserError> {
        let state = self.state.read().await;
        let count = state.elements.get(selector).map(Vec::len).unwrap_or(0);
        Ok((0..count).map(|i| element_id(selector, i)).collect())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), BrowserError> {
        let (selector, _) = split_element(element);
        self.record(BrowserAction::Clear(selector.to_string())).await;
        Ok(())
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Result<(), BrowserError> {
        let (selector, _) = split_element(element);
        self.record(BrowserAction::Type {
            selector: selector.to_string(),
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn press_enter(&self, element: &ElementRef) -> Result<(), BrowserError> {
        let (selector, _) = split_element(element);
        self.record(BrowserAction::PressEnter(selector.to_string()))
            .await;
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<(), BrowserError> {
        let (selector, _) = split_element(element);
        self.record(BrowserAction::Click(selector.to_string())).await;
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let (selector, index) = split_element(element);
        let state = self.state.read().await;
        Ok(state
            .elements
            .get(selector)
            .and_then(|list| list.get(index))
            .and_then(|attrs| attrs.get(name))
            .cloned())
    }

    async fn page_text(&self) -> Result<String, BrowserError> {
        Ok(self.state.read().await.page_text.clone())
    }

    async fn pause(&self, _duration: Duration) {}

    async fn close(&self) -> Result<(), BrowserError> {
        let mut state = self.state.write().await;
        state.actions.push(BrowserAction::Close);
        state.sessions_closed += 1;
        Ok(())
    }
}
