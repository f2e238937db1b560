use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{TranscriptConfig, TranscriptError, TranscriptSegment, TranscriptSource};
use crate::metrics;

static TEXT_NODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text\s+start="([0-9.]+)"(?:\s+dur="([0-9.]+)")?[^>]*>(.*?)</text>"#).unwrap()
});

/// Reads captions from YouTube's public timed-text endpoint.
pub struct YoutubeTranscriptSource {
    client: reqwest::Client,
    config: TranscriptConfig,
}

impl YoutubeTranscriptSource {
    pub fn new(config: TranscriptConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let started = Instant::now();
        let result = self.fetch_xml(video_id).await;
        metrics::record_external_call(
            "youtube_transcripts",
            "fetch",
            started.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        let segments = parse_timedtext(&result?)?;
        if segments.is_empty() {
            return Err(TranscriptError::Unavailable(video_id.to_string()));
        }

        debug!(video_id, segments = segments.len(), "Fetched transcript");
        Ok(segments)
    }
}

impl YoutubeTranscriptSource {
    async fn fetch_xml(&self, video_id: &str) -> Result<String, TranscriptError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("lang", self.config.language.as_str()), ("v", video_id)])
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| TranscriptError::Http(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TranscriptError::Unavailable(video_id.to_string()));
        }
        if !status.is_success() {
            return Err(TranscriptError::Http(format!("status {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TranscriptError::Http(e.to_string()))
    }
}

/// Parses a timed-text XML document into segments. An empty document
/// yields no segments.
fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    if !xml.contains("<transcript") {
        return Err(TranscriptError::Parse("missing <transcript> root".to_string()));
    }

    TEXT_NODE
        .captures_iter(xml)
        .map(|caps| {
            let start_secs = caps[1]
                .parse::<f64>()
                .map_err(|e| TranscriptError::Parse(e.to_string()))?;
            let duration_secs = caps
                .get(2)
                .map(|d| d.as_str().parse::<f64>())
                .transpose()
                .map_err(|e| TranscriptError::Parse(e.to_string()))?
                .unwrap_or(0.0);
            Ok(TranscriptSegment {
                text: decode_entities(&caps[3]),
                start_secs,
                duration_secs,
            })
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    // Captions are often double-escaped (`&amp;#39;`), so `&amp;` goes first.
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.1">Welcome to Bangkok</text><text start="2.6" dur="3">It&amp;#39;s hot &amp; humid</text></transcript>"#;
        let segments = parse_timedtext(xml).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Welcome to Bangkok");
        assert_eq!(segments[0].start_secs, 0.5);
        assert_eq!(segments[1].text, "It's hot & humid");
        assert_eq!(segments[1].duration_secs, 3.0);
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_timedtext("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_transcript() {
        let err = parse_timedtext("<html>consent page</html>").unwrap_err();
        assert!(matches!(err, TranscriptError::Parse(_)));
    }
}
