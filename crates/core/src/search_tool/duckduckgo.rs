use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use super::{SearchTool, SearchToolConfig, SearchToolError};
use crate::metrics;

/// DuckDuckGo instant-answer API client.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    config: SearchToolConfig,
}

impl DuckDuckGoSearch {
    pub fn new(config: SearchToolConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a direct topic or a named group of topics.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

impl RelatedTopic {
    fn flatten<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            RelatedTopic::Topic { text, first_url } => out.push((text, first_url)),
            RelatedTopic::Group { topics } => topics.iter().for_each(|t| t.flatten(out)),
        }
    }
}

impl InstantAnswer {
    fn digest(&self, max_topics: usize) -> String {
        let mut lines = Vec::new();

        if !self.answer.is_empty() {
            lines.push(format!("Answer: {}", self.answer));
        }
        if !self.abstract_text.is_empty() {
            let heading = if self.heading.is_empty() {
                "Summary"
            } else {
                &self.heading
            };
            lines.push(format!("{}: {} ({})", heading, self.abstract_text, self.abstract_url));
        }

        let mut topics = Vec::new();
        self.related_topics.iter().for_each(|t| t.flatten(&mut topics));
        for (text, url) in topics.into_iter().take(max_topics) {
            if url.is_empty() {
                lines.push(format!("- {}", text));
            } else {
                lines.push(format!("- {} ({})", text, url));
            }
        }

        lines.join("\n")
    }
}

#[async_trait]
impl SearchTool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<String, SearchToolError> {
        let started = Instant::now();
        let result = self.query(query).await;
        metrics::record_external_call(
            "duckduckgo",
            "search",
            started.elapsed().as_secs_f64(),
            result.is_ok(),
        );
        Ok(result?.digest(self.config.max_topics))
    }
}

impl DuckDuckGoSearch {
    async fn query(&self, query: &str) -> Result<InstantAnswer, SearchToolError> {
        let url = format!(
            "{}/?q={}&format=json&no_html=1&skip_disambig=1",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| SearchToolError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchToolError::Api(format!("status {}", response.status())));
        }

        // The API sometimes answers with `application/x-javascript`, so parse the text.
        let body = response
            .text()
            .await
            .map_err(|e| SearchToolError::Http(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| SearchToolError::Api(e.to_string()))
    }
}
