//! W3C WebDriver HTTP client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use super::config::BrowserConfig;
use super::error::BrowserError;
use super::traits::{BrowserDriver, BrowserSession, ElementRef};

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver code point for the Enter key.
const ENTER_KEY: &str = "\u{E007}";

/// Every WebDriver response wraps its payload in `value`.
#[derive(Debug, Deserialize)]
struct WireResponse {
    value: Value,
}

/// Browser driver that talks to a WebDriver server.
pub struct WebDriverBrowser {
    client: reqwest::Client,
    config: BrowserConfig,
}

impl WebDriverBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Capabilities for a new session.
    fn capabilities(&self) -> Value {
        let mut always_match = json!({ "browserName": self.config.browser_name });

        if self.config.headless {
            match self.config.browser_name.as_str() {
                "chrome" | "chromium" => {
                    always_match["goog:chromeOptions"] = json!({
                        "args": ["--headless=new", "--disable-gpu", "--no-sandbox", "--window-size=1920,1080"]
                    });
                }
                "firefox" => {
                    always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
                }
                _ => {}
            }
        }

        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

#[async_trait]
impl BrowserDriver for WebDriverBrowser {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let url = format!("{}/session", self.config.webdriver_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&self.capabilities())
            .send()
            .await
            .map_err(|e| BrowserError::Http(e.to_string()))?;
        let value = read_value(response).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Protocol(format!("missing sessionId in {}", value)))?
            .to_string();

        debug!(session_id = %session_id, "Opened browser session");

        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            base: format!("{}/{}", url, session_id),
            session_id,
            poll_interval: self.config.poll_interval(),
            request_timeout: timeout,
            closed: AtomicBool::new(false),
        }))
    }
}

/// One WebDriver session.
struct WebDriverSession {
    client: reqwest::Client,
    base: String,
    session_id: String,
    poll_interval: Duration,
    request_timeout: Duration,
    closed: AtomicBool,
}

impl WebDriverSession {
    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(())
        }
    }

    async fn get(&self, path: &str) -> Result<Value, BrowserError> {
        self.ensure_open()?;
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| BrowserError::Http(e.to_string()))?;
        read_value(response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, BrowserError> {
        self.ensure_open()?;
        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrowserError::Http(e.to_string()))?;
        read_value(response).await
    }

    async fn find_one(&self, selector: &str) -> Result<ElementRef, BrowserError> {
        let value = self
            .post("/element", json!({ "using": "css selector", "value": selector }))
            .await?;
        element_from(&value)
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        debug!(session_id = %self.session_id, url, "Navigating");
        self.post("/url", json!({ "url": url })).await.map(|_| ())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let value = self.get("/url").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Protocol(format!("expected URL string, got {}", value)))
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementRef, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_one(selector).await {
                Ok(element) => return Ok(element),
                Err(e) if e.is_no_such_element() => {}
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(BrowserError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>, BrowserError> {
        let value = self
            .post("/elements", json!({ "using": "css selector", "value": selector }))
            .await?;
        value
            .as_array()
            .ok_or_else(|| BrowserError::Protocol(format!("expected element list, got {}", value)))?
            .iter()
            .map(element_from)
            .collect()
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), BrowserError> {
        self.post(&format!("/element/{}/clear", element.id()), json!({}))
            .await
            .map(|_| ())
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Result<(), BrowserError> {
        self.post(&format!("/element/{}/value", element.id()), json!({ "text": text }))
            .await
            .map(|_| ())
    }

    async fn press_enter(&self, element: &ElementRef) -> Result<(), BrowserError> {
        self.type_text(element, ENTER_KEY).await
    }

    async fn click(&self, element: &ElementRef) -> Result<(), BrowserError> {
        self.post(&format!("/element/{}/click", element.id()), json!({}))
            .await
            .map(|_| ())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let value = self
            .get(&format!("/element/{}/attribute/{}", element.id(), name))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn page_text(&self) -> Result<String, BrowserError> {
        let value = self
            .post(
                "/execute/sync",
                json!({ "script": "return document.body ? document.body.innerText : '';", "args": [] }),
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let response = self
            .client
            .delete(&self.base)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| BrowserError::Http(e.to_string()))?;
        read_value(response).await?;

        debug!(session_id = %self.session_id, "Closed browser session");
        Ok(())
    }
}

/// Unwraps `value`, turning WebDriver error objects into [`BrowserError`].
async fn read_value(response: reqwest::Response) -> Result<Value, BrowserError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BrowserError::Http(e.to_string()))?;
    parse_wire(status.is_success(), &body)
}

fn parse_wire(success: bool, body: &str) -> Result<Value, BrowserError> {
    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|e| BrowserError::Protocol(format!("{}: {}", e, body)))?;

    if let Some(error) = wire.value.get("error").and_then(Value::as_str) {
        let message = wire
            .value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(BrowserError::WebDriver {
            error: error.to_string(),
            message: message.to_string(),
        });
    }

    if !success {
        return Err(BrowserError::Protocol(body.to_string()));
    }

    Ok(wire.value)
}

fn element_from(value: &Value) -> Result<ElementRef, BrowserError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| BrowserError::Protocol(format!("expected element reference, got {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_chrome_capabilities() {
        let browser = WebDriverBrowser::new(BrowserConfig::default());
        let caps = browser.capabilities();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "chrome");
        let args = always["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_headed_capabilities_have_no_args() {
        let config = BrowserConfig {
            headless: false,
            ..Default::default()
        };
        let caps = WebDriverBrowser::new(config).capabilities();
        assert!(caps["capabilities"]["alwaysMatch"]
            .get("goog:chromeOptions")
            .is_none());
    }

    #[test]
    fn test_parse_wire_success() {
        let value = parse_wire(true, r#"{"value": "https://example.com/"}"#).unwrap();
        assert_eq!(value, json!("https://example.com/"));
    }

    #[test]
    fn test_parse_wire_no_such_element() {
        let body = r#"{"value": {"error": "no such element", "message": "Unable to locate", "stacktrace": ""}}"#;
        let err = parse_wire(false, body).unwrap_err();
        assert!(err.is_no_such_element());
    }

    #[test]
    fn test_parse_wire_garbage() {
        let err = parse_wire(false, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, BrowserError::Protocol(_)));
    }

    #[test]
    fn test_element_from() {
        let mut value = json!({});
        value[ELEMENT_KEY] = json!("abc-123");
        assert_eq!(element_from(&value).unwrap(), ElementRef("abc-123".to_string()));
        assert!(element_from(&json!({})).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_webdriver() {
        let config = BrowserConfig {
            webdriver_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let result = WebDriverBrowser::new(config).open_session().await;
        assert!(matches!(result, Err(BrowserError::Http(_))));
    }
}
