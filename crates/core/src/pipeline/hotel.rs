//! Hotel search.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::PipelineError;
use super::request::HotelSearchRequest;
use super::types::HotelResult;
use super::{to_document, PipelineDeps, SearchPipeline};
use crate::browser::{BrowserSession, SessionGuard};
use crate::task::SearchKind;

/// Present once the hotel listing has rendered.
const RESULTS_READY: &str = "main";

pub struct HotelPipeline {
    deps: PipelineDeps,
}

impl HotelPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self { deps }
    }

    /// Phase 1: open the listing for the location and return its URL.
    pub async fn resolve_url(&self, request: &HotelSearchRequest) -> Result<String, PipelineError> {
        let session = SessionGuard::new(self.deps.browser.open_session().await?);
        let result = self.open_listing(session.session(), request).await;
        session.close().await;
        result
    }

    async fn open_listing(
        &self,
        session: &dyn BrowserSession,
        request: &HotelSearchRequest,
    ) -> Result<String, PipelineError> {
        let url = format!(
            "{}?q={}",
            self.deps.sites.hotels_url,
            urlencoding::encode(&request.location)
        );
        session.navigate(&url).await?;
        session
            .wait_for_element(RESULTS_READY, self.deps.browser_config.element_timeout())
            .await?;
        session.pause(self.deps.browser_config.page_load_wait()).await;
        Ok(session.current_url().await?)
    }

    /// Phase 2: extract up to `hotel_count` options.
    pub async fn extract(
        &self,
        url: &str,
        request: &HotelSearchRequest,
    ) -> Result<HotelResult, PipelineError> {
        let limit = self.deps.sites.hotel_count;
        let instructions = format!(
            "The stay is check-in {} to check-out {}. List the {} hotels on this page \
             that best match these preferences: {}. Report prices exactly as shown; \
             leave total_price empty when the page does not show one.",
            request.check_in,
            request.check_out,
            limit,
            Value::Object(request.preferences.clone())
        );
        let value = self
            .deps
            .extractor
            .extract(url, &hotel_schema(limit), &instructions)
            .await?;
        HotelResult::from_extracted(value, limit)
    }
}

#[async_trait]
impl SearchPipeline for HotelPipeline {
    type Request = HotelSearchRequest;

    fn kind(&self) -> SearchKind {
        SearchKind::Hotel
    }

    async fn run(&self, request: HotelSearchRequest) -> Result<Value, PipelineError> {
        info!(location = %request.location, check_in = %request.check_in, "Starting hotel search");
        let url = self.resolve_url(&request).await?;
        debug!(url = %url, "Resolved hotel listing");
        let result = self.extract(&url, &request).await?;
        to_document(&result)
    }
}

fn hotel_schema(limit: usize) -> Value {
    json!({
        "type": "object",
        "required": ["hotels"],
        "properties": {
            "hotels": {
                "type": "array",
                "maxItems": limit,
                "items": {
                    "type": "object",
                    "required": ["name", "price_per_night", "total_price"],
                    "properties": {
                        "name": {"type": "string"},
                        "price_per_night": {"type": "string"},
                        "total_price": {"type": "string"},
                        "rating": {"type": "string"},
                        "address": {"type": "string"},
                        "amenities": {"type": "array", "items": {"type": "string"}},
                        "check_in": {"type": "string"},
                        "check_out": {"type": "string"}
                    }
                }
            }
        }
    })
}
