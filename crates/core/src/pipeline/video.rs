//! Video review answers.
//!
//! The question becomes a search title, the top results are read through
//! their transcripts, and the LLM answers from what the reviewers said.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::PipelineError;
use super::request::VideoSearchRequest;
use super::types::{VideoResult, VideoSource};
use super::{to_document, PipelineDeps, SearchPipeline};
use crate::browser::{BrowserSession, SessionGuard};
use crate::llm::CompletionRequest;
use crate::task::SearchKind;
use crate::transcript::join_segments;

/// Thumbnail links of search results.
pub(crate) const RESULT_LINKS: &str = "ytd-video-renderer a#thumbnail";

/// Transcript text sent to the model is capped at this many characters.
const MAX_CONTENT_CHARS: usize = 60_000;

pub struct VideoPipeline {
    deps: PipelineDeps,
}

impl VideoPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self { deps }
    }

    /// Asks the model for a short search title matching the question.
    pub async fn search_title(&self, question: &str) -> Result<String, PipelineError> {
        let prompt = format!(
            "You are a travel assistant. Based on the user's input, write a concise video \
             search title for the topic. If the user asks about places, focus on the \
             locations. If the user asks about food, focus on the restaurants or dishes.\n\n\
             User input:\n{}\n\nReply with the title only.",
            question
        );
        let response = self
            .deps
            .llm
            .complete(CompletionRequest::new(prompt).with_max_tokens(64))
            .await?;

        let title = clean_title(&response.text);
        if title.is_empty() {
            return Err(PipelineError::Extraction(
                "model returned an empty search title".to_string(),
            ));
        }
        Ok(title)
    }

    /// Searches the video site and returns absolute URLs of the top results.
    pub async fn top_videos(&self, title: &str) -> Result<Vec<String>, PipelineError> {
        let session = SessionGuard::new(self.deps.browser.open_session().await?);
        let result = self.collect_links(session.session(), title).await;
        session.close().await;
        result
    }

    async fn collect_links(
        &self,
        session: &dyn BrowserSession,
        title: &str,
    ) -> Result<Vec<String>, PipelineError> {
        let root = self.deps.sites.videos_url.trim_end_matches('/');
        let url = format!("{}/results?search_query={}", root, urlencoding::encode(title));
        session.navigate(&url).await?;
        session
            .wait_for_element(RESULT_LINKS, self.deps.browser_config.element_timeout())
            .await?;
        session.pause(self.deps.browser_config.page_load_wait()).await;

        let mut links = Vec::new();
        for element in session.find_all(RESULT_LINKS).await? {
            if links.len() == self.deps.sites.video_count {
                break;
            }
            match session.attribute(&element, "href").await? {
                Some(href) if !href.is_empty() => links.push(absolute_url(root, &href)),
                _ => {}
            }
        }

        if links.is_empty() {
            return Err(PipelineError::Navigation(format!(
                "no video results for \"{}\"",
                title
            )));
        }
        Ok(links)
    }

    /// Fetches every transcript concurrently. Videos without one are kept
    /// in the source list but contribute no text.
    async fn read_transcripts(&self, urls: Vec<String>) -> (Vec<VideoSource>, String) {
        let fetches = urls.into_iter().map(|url| async move {
            let video_id = video_id(&url).unwrap_or_default().to_string();
            let text = if video_id.is_empty() {
                None
            } else {
                match self.deps.transcripts.fetch(&video_id).await {
                    Ok(segments) => Some(join_segments(&segments)).filter(|t| !t.is_empty()),
                    Err(e) => {
                        warn!(video_id = %video_id, error = %e, "Skipping video without transcript");
                        None
                    }
                }
            };
            (url, video_id, text)
        });

        let mut sources = Vec::new();
        let mut content = Vec::new();
        for (url, video_id, text) in join_all(fetches).await {
            sources.push(VideoSource {
                url,
                video_id,
                transcript_found: text.is_some(),
            });
            content.extend(text);
        }
        (sources, content.join(" "))
    }

    async fn answer(&self, question: &str, content: &str) -> Result<String, PipelineError> {
        let prompt = format!(
            "You are a detail-oriented travel review assistant. Answer the user's question \
             using the video content below.\n\n\
             Video content:\n{}\n\n\
             User question:\n{}\n\n\
             Start with a brief summary of what the content says about the question, \
             highlight specific places, features or experiences it mentions, and finish \
             with practical recommendations where they apply.",
            truncate(content, MAX_CONTENT_CHARS),
            question
        );
        let response = self
            .deps
            .llm
            .complete(CompletionRequest::new(prompt).with_max_tokens(2048))
            .await?;
        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl SearchPipeline for VideoPipeline {
    type Request = VideoSearchRequest;

    fn kind(&self) -> SearchKind {
        SearchKind::Video
    }

    async fn run(&self, request: VideoSearchRequest) -> Result<Value, PipelineError> {
        info!("Starting video review search");
        let title = self.search_title(&request.user_input).await?;
        debug!(title = %title, "Generated video search title");

        let urls = self.top_videos(&title).await?;
        let (videos, content) = self.read_transcripts(urls).await;
        if content.is_empty() {
            return Err(PipelineError::Extraction(format!(
                "none of the {} videos had a readable transcript",
                videos.len()
            )));
        }

        let answer = self.answer(&request.user_input, &content).await?;
        to_document(&VideoResult {
            title,
            videos,
            answer,
        })
    }
}

/// Takes the first line and drops surrounding quotes or Markdown emphasis.
fn clean_title(text: &str) -> String {
    text.trim()
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("Title:")
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '#' || c.is_whitespace())
        .to_string()
}

fn absolute_url(root: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", root, href.trim_start_matches('/'))
    }
}

/// The `v` query parameter of a watch URL.
fn video_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("v=")?;
    let id = rest.split('&').next().unwrap_or_default();
    Some(id).filter(|id| !id.is_empty())
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCapabilities;

    fn request() -> VideoSearchRequest {
        VideoSearchRequest {
            user_input: "Is Le Bernardin worth it?".to_string(),
        }
    }

    async fn with_results(mocks: &MockCapabilities, hrefs: &[&str]) {
        mocks
            .browser
            .set_elements(RESULT_LINKS, "href", hrefs)
            .await;
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("\"Le Bernardin Review\"\n"), "Le Bernardin Review");
        assert_eq!(clean_title("**Bangkok street food**"), "Bangkok street food");
        assert_eq!(clean_title("Title: Hanoi night markets"), "Hanoi night markets");
        assert_eq!(clean_title("   "), "");
    }

    #[test]
    fn test_video_id() {
        assert_eq!(video_id("https://www.youtube.com/watch?v=abc123"), Some("abc123"));
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=abc123&t=42s"),
            Some("abc123")
        );
        assert_eq!(video_id("https://www.youtube.com/shorts/xyz"), None);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://www.youtube.com", "/watch?v=a"),
            "https://www.youtube.com/watch?v=a"
        );
        assert_eq!(
            absolute_url("https://www.youtube.com", "https://m.youtube.com/watch?v=a"),
            "https://m.youtube.com/watch?v=a"
        );
    }

    #[tokio::test]
    async fn test_video_pipeline_success() {
        let mocks = MockCapabilities::new();
        mocks.llm.push_reply("\"Le Bernardin review\"").await;
        mocks.llm.push_reply("Reviewers loved the fish.").await;
        with_results(&mocks, &["/watch?v=a1", "/watch?v=b2", "/watch?v=c3", "/watch?v=d4"]).await;
        mocks.transcripts.set_transcript("a1", "The halibut was perfect.").await;
        mocks.transcripts.set_transcript("c3", "Service was slow.").await;

        let pipeline = VideoPipeline::new(mocks.deps());
        let data = pipeline.run(request()).await.unwrap();

        assert_eq!(data["title"], "Le Bernardin review");
        assert_eq!(data["answer"], "Reviewers loved the fish.");
        let videos = data["videos"].as_array().unwrap();
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[0]["url"], "https://www.youtube.com/watch?v=a1");
        assert_eq!(videos[1]["transcript_found"], false);

        let navigations = mocks.browser.navigations().await;
        assert_eq!(
            navigations,
            vec!["https://www.youtube.com/results?search_query=Le%20Bernardin%20review"]
        );

        let prompts = mocks.llm.recorded_prompts().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("The halibut was perfect. Service was slow."));
        assert!(prompts[1].contains("Is Le Bernardin worth it?"));
        assert_eq!(mocks.browser.sessions_closed().await, 1);
    }

    #[tokio::test]
    async fn test_no_transcripts_fails_before_answering() {
        let mocks = MockCapabilities::new();
        mocks.llm.push_reply("Le Bernardin review").await;
        with_results(&mocks, &["/watch?v=a1", "/watch?v=b2"]).await;

        let pipeline = VideoPipeline::new(mocks.deps());
        let err = pipeline.run(request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Extraction(_)));
        assert_eq!(mocks.llm.call_count().await, 1);
        assert_eq!(mocks.transcripts.requested().await, vec!["a1", "b2"]);
    }

    #[tokio::test]
    async fn test_no_results_is_navigation_error() {
        let mocks = MockCapabilities::new();
        mocks.llm.push_reply("Le Bernardin review").await;

        let pipeline = VideoPipeline::new(mocks.deps());
        let err = pipeline.run(request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Navigation(_)));
    }

    #[tokio::test]
    async fn test_title_failure_skips_browser() {
        let mocks = MockCapabilities::new();
        mocks.llm.push_error("quota exceeded").await;

        let pipeline = VideoPipeline::new(mocks.deps());
        let err = pipeline.run(request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Llm(_)));
        assert_eq!(mocks.browser.sessions_opened().await, 0);
    }
}
