use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{Extractor, ExtractorError};
use crate::browser::{BrowserDriver, BrowserSession, SessionGuard};
use crate::llm::{parse_json_reply, CompletionRequest, LlmClient};

const SYSTEM_PROMPT: &str = "You extract structured data from web pages. \
Reply with a single JSON value that follows the given schema and nothing else. \
Use only information present in the page text.";

/// Extractor that loads a page in a browser and has the LLM read it.
pub struct LlmPageExtractor {
    browser: Arc<dyn BrowserDriver>,
    llm: Arc<dyn LlmClient>,
    settle: Duration,
    max_page_chars: usize,
    max_tokens: u32,
}

impl LlmPageExtractor {
    pub fn new(browser: Arc<dyn BrowserDriver>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            browser,
            llm,
            settle: Duration::from_secs(2),
            max_page_chars: 40_000,
            max_tokens: 2048,
        }
    }

    /// Time to let the page render before reading it.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Caps how much page text is sent to the model.
    pub fn with_max_page_chars(mut self, max_page_chars: usize) -> Self {
        self.max_page_chars = max_page_chars;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn read_page(
        &self,
        session: &dyn BrowserSession,
        url: &str,
    ) -> Result<String, ExtractorError> {
        session.navigate(url).await?;
        session.pause(self.settle).await;
        let text = session.page_text().await?;
        Ok(truncate_chars(&text, self.max_page_chars).to_string())
    }
}

#[async_trait]
impl Extractor for LlmPageExtractor {
    fn name(&self) -> &str {
        "llm_page"
    }

    async fn extract(
        &self,
        url: &str,
        schema: &Value,
        instructions: &str,
    ) -> Result<Value, ExtractorError> {
        let session = SessionGuard::new(self.browser.open_session().await?);
        let page = self.read_page(session.session(), url).await;
        session.close().await;
        let page = page?;

        if page.trim().is_empty() {
            return Err(ExtractorError::Malformed(format!(
                "page at {} has no visible text",
                url
            )));
        }

        debug!(url, chars = page.len(), "Extracting from page");

        let prompt = format!(
            "Instructions:\n{}\n\nJSON schema:\n{}\n\nPage URL: {}\n\nPage text:\n{}",
            instructions, schema, url, page
        );
        let request = CompletionRequest::new(prompt)
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await?;
        let value: Value = parse_json_reply(&response.text)
            .map_err(|e| ExtractorError::Malformed(e.to_string()))?;
        Ok(value)
    }
}

/// Longest prefix of `text` with at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBrowser, MockLlm};
    use serde_json::json;

    #[tokio::test]
    async fn test_extract_parses_fenced_reply() {
        let browser = Arc::new(MockBrowser::new());
        browser.set_page_text("Hotel Sunrise $120 per night").await;
        let llm = Arc::new(MockLlm::new());
        llm.push_reply("```json\n{\"hotels\": [{\"name\": \"Hotel Sunrise\"}]}\n```")
            .await;

        let extractor = LlmPageExtractor::new(browser.clone(), llm.clone())
            .with_settle(Duration::ZERO);
        let value = extractor
            .extract("https://hotels.example/list", &json!({"type": "object"}), "find hotels")
            .await
            .unwrap();

        assert_eq!(value["hotels"][0]["name"], "Hotel Sunrise");
        assert_eq!(browser.sessions_opened().await, 1);
        assert_eq!(browser.sessions_closed().await, 1);

        let prompts = llm.recorded_prompts().await;
        assert!(prompts[0].contains("Hotel Sunrise $120"));
        assert!(prompts[0].contains("find hotels"));
    }

    #[tokio::test]
    async fn test_session_closed_when_navigation_fails() {
        let browser = Arc::new(MockBrowser::new());
        browser.fail_navigation("connection reset").await;
        let llm = Arc::new(MockLlm::new());

        let extractor = LlmPageExtractor::new(browser.clone(), llm).with_settle(Duration::ZERO);
        let err = extractor
            .extract("https://x.example", &json!({}), "")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Browser(_)));
        assert_eq!(browser.sessions_closed().await, 1);
    }

    #[tokio::test]
    async fn test_non_json_reply_is_malformed() {
        let browser = Arc::new(MockBrowser::new());
        browser.set_page_text("some text").await;
        let llm = Arc::new(MockLlm::new());
        llm.push_reply("I could not find anything").await;

        let extractor = LlmPageExtractor::new(browser, llm).with_settle(Duration::ZERO);
        let err = extractor
            .extract("https://x.example", &json!({}), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Malformed(_)));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
