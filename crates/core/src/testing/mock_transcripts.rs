//! Mock transcript source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcript::{TranscriptError, TranscriptSegment, TranscriptSource};

/// Mock implementation of the TranscriptSource trait.
///
/// Unknown video ids are reported as having no transcript.
#[derive(Debug, Clone, Default)]
pub struct MockTranscripts {
    transcripts: Arc<RwLock<HashMap<String, String>>>,
    requested: Arc<RwLock<Vec<String>>>,
}

impl MockTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single-segment transcript for a video.
    pub async fn set_transcript(&self, video_id: &str, text: &str) {
        self.transcripts
            .write()
            .await
            .insert(video_id.to_string(), text.to_string());
    }

    /// Video ids requested so far.
    pub async fn requested(&self) -> Vec<String> {
        self.requested.read().await.clone()
    }
}

#[async_trait]
impl TranscriptSource for MockTranscripts {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        self.requested.write().await.push(video_id.to_string());
        match self.transcripts.read().await.get(video_id) {
            Some(text) => Ok(vec![TranscriptSegment {
                text: text.clone(),
                start_secs: 0.0,
                duration_secs: 1.0,
            }]),
            None => Err(TranscriptError::Unavailable(video_id.to_string())),
        }
    }
}
