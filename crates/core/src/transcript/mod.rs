//! Video transcript lookup.

mod youtube;

pub use youtube::YoutubeTranscriptSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from transcript lookup.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Transcript HTTP error: {0}")]
    Http(String),

    #[error("No transcript available for video {0}")]
    Unavailable(String),

    #[error("Could not parse transcript: {0}")]
    Parse(String),
}

/// One caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// Joins segment texts into one block of prose.
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source of video transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Returns the name of this source.
    fn name(&self) -> &str;

    /// Fetches the captions of a video.
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

/// Transcript lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Timed-text endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Caption language code.
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.youtube.com/api/timedtext".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout() -> u64 {
    20
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            timeout_secs: default_timeout(),
        }
    }
}
