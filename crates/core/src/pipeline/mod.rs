//! Scrape pipelines.
//!
//! Each pipeline runs in two phases:
//!
//! 1. **URL resolution**: deterministic browser automation fills a search
//!    form and returns the result-listing URL.
//! 2. **Extraction**: the URL, a JSON schema and instructions go to an
//!    [`Extractor`](crate::extractor::Extractor), which returns structured
//!    data.
//!
//! The video pipeline differs: an LLM turns the question into a search
//! title, transcripts of the top results are fetched, and a final LLM call
//! answers the question from them.
//!
//! Any error aborts the pipeline; nothing partial is returned.

mod config;
mod error;
mod flight;
mod hotel;
mod request;
mod restaurant;
mod session;
mod types;
mod video;

pub use config::SitesConfig;
pub use error::PipelineError;
pub use flight::FlightPipeline;
pub use hotel::HotelPipeline;
pub use request::{
    calendar_label, FlightSearchRequest, HotelSearchRequest, Preferences, RestaurantSearchRequest,
    ValidationError, VideoSearchRequest,
};
pub use restaurant::RestaurantPipeline;
pub use types::{
    FlightLeg, FlightResult, HotelOption, HotelResult, RestaurantOption, RestaurantResult,
    VideoResult, VideoSource,
};
pub use video::VideoPipeline;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::browser::{BrowserConfig, BrowserDriver};
use crate::dispatch::JobFuture;
use crate::extractor::Extractor;
use crate::llm::LlmClient;
use crate::task::SearchKind;
use crate::transcript::TranscriptSource;

/// External collaborators shared by all pipelines.
#[derive(Clone)]
pub struct PipelineDeps {
    pub browser: Arc<dyn BrowserDriver>,
    pub extractor: Arc<dyn Extractor>,
    pub llm: Arc<dyn LlmClient>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub browser_config: BrowserConfig,
    pub sites: SitesConfig,
}

/// A scrape pipeline for one kind of search.
#[async_trait]
pub trait SearchPipeline: Send + Sync {
    type Request: Send + 'static;

    fn kind(&self) -> SearchKind;

    /// Runs both phases and returns the result document.
    async fn run(&self, request: Self::Request) -> Result<Value, PipelineError>;
}

/// Packages a pipeline run as a worker pool job.
pub fn into_job<P>(pipeline: Arc<P>, request: P::Request) -> JobFuture
where
    P: SearchPipeline + 'static,
{
    Box::pin(async move { pipeline.run(request).await })
}

/// All pipelines, built from one set of collaborators.
#[derive(Clone)]
pub struct Pipelines {
    pub flight: Arc<FlightPipeline>,
    pub hotel: Arc<HotelPipeline>,
    pub restaurant: Arc<RestaurantPipeline>,
    pub video: Arc<VideoPipeline>,
}

impl Pipelines {
    pub fn new(deps: PipelineDeps) -> Self {
        Self {
            flight: Arc::new(FlightPipeline::new(deps.clone())),
            hotel: Arc::new(HotelPipeline::new(deps.clone())),
            restaurant: Arc::new(RestaurantPipeline::new(deps.clone())),
            video: Arc::new(VideoPipeline::new(deps)),
        }
    }
}

fn to_document<T: serde::Serialize>(result: &T) -> Result<Value, PipelineError> {
    serde_json::to_value(result).map_err(|e| PipelineError::Extraction(e.to_string()))
}
