//! Browser configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the WebDriver-backed browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver defaults to port 9515).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Browser requested in the session capabilities ("chrome" or "firefox").
    #[serde(default = "default_browser_name")]
    pub browser_name: String,

    /// Run without a visible window.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// How long to wait for an element to appear (milliseconds).
    #[serde(default = "default_element_timeout")]
    pub element_timeout_ms: u64,

    /// Delay between element lookups while waiting (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Pause after a navigation or form submit so the page can settle (milliseconds).
    #[serde(default = "default_page_load_wait")]
    pub page_load_wait_ms: u64,

    /// Timeout for a single WebDriver HTTP call (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_browser_name() -> String {
    "chrome".to_string()
}

fn default_true() -> bool {
    true
}

fn default_element_timeout() -> u64 {
    5000
}

fn default_poll_interval() -> u64 {
    250
}

fn default_page_load_wait() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            browser_name: default_browser_name(),
            headless: default_true(),
            element_timeout_ms: default_element_timeout(),
            poll_interval_ms: default_poll_interval(),
            page_load_wait_ms: default_page_load_wait(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BrowserConfig {
    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn page_load_wait(&self) -> Duration {
        Duration::from_millis(self.page_load_wait_ms)
    }
}
