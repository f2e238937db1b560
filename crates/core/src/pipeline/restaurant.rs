//! Restaurant search.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::PipelineError;
use super::request::RestaurantSearchRequest;
use super::session::{click_when_ready, css_string};
use super::types::RestaurantResult;
use super::{to_document, PipelineDeps, SearchPipeline};
use crate::browser::{BrowserSession, SessionGuard};
use crate::task::SearchKind;

const DATE_SELECTOR: &str = r#"[aria-label="Date selector"]"#;
const DAY_PICKER: &str = "#search-autocomplete-day-picker-wrapper";
const TIME_SELECTOR: &str = r#"select[aria-label="Time selector"]"#;
const PARTY_SIZE_SELECTOR: &str = r#"select[aria-label="Party size selector"]"#;
const LOCATION_INPUT: &str = "#home-page-autocomplete-input";

const STEP_PAUSE: Duration = Duration::from_secs(1);

pub struct RestaurantPipeline {
    deps: PipelineDeps,
}

impl RestaurantPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self { deps }
    }

    /// Phase 1: set the optional filters, search the location and return
    /// the listing URL.
    pub async fn resolve_url(
        &self,
        request: &RestaurantSearchRequest,
    ) -> Result<String, PipelineError> {
        let session = SessionGuard::new(self.deps.browser.open_session().await?);
        let result = self.fill_search(session.session(), request).await;
        session.close().await;
        result
    }

    async fn fill_search(
        &self,
        session: &dyn BrowserSession,
        request: &RestaurantSearchRequest,
    ) -> Result<String, PipelineError> {
        let timeout = self.deps.browser_config.element_timeout();
        let settle = self.deps.browser_config.page_load_wait();

        session.navigate(&self.deps.sites.restaurants_url).await?;
        session.pause(settle).await;

        if let Some(date) = &request.date {
            click_when_ready(session, DATE_SELECTOR, timeout).await?;
            session.wait_for_element(DAY_PICKER, timeout).await?;
            let day = format!(r#"button[aria-label="{}"]"#, css_string(date));
            click_when_ready(session, &day, timeout).await?;
            session.pause(STEP_PAUSE).await;
        }

        // The time list depends on the venue's hours, so a miss is tolerated.
        if let Some(time) = &request.time {
            match choose_option(session, TIME_SELECTOR, time, timeout).await {
                Ok(()) => debug!(time = %time, "Selected reservation time"),
                Err(e) => warn!(time = %time, error = %e, "Could not select reservation time"),
            }
            session.pause(STEP_PAUSE).await;
        }

        if let Some(party_size) = request.party_size {
            choose_option(session, PARTY_SIZE_SELECTOR, &party_size.to_string(), timeout).await?;
        }

        let input = click_when_ready(session, LOCATION_INPUT, timeout).await?;
        session.clear(&input).await?;
        session.type_text(&input, &request.location).await?;
        session.press_enter(&input).await?;
        session.pause(settle).await;

        Ok(session.current_url().await?)
    }

    /// Phase 2: extract the single best match.
    pub async fn extract(
        &self,
        url: &str,
        request: &RestaurantSearchRequest,
    ) -> Result<RestaurantResult, PipelineError> {
        let instructions = format!(
            "Find restaurants matching these preferences: {}. Narrow the results by rating \
             and price range where the page allows it. Pick ONE restaurant that fits best \
             and report only that one.",
            Value::Object(request.preferences.clone())
        );
        let value = self
            .deps
            .extractor
            .extract(url, &restaurant_schema(), &instructions)
            .await?;
        RestaurantResult::from_extracted(value)
    }
}

#[async_trait]
impl SearchPipeline for RestaurantPipeline {
    type Request = RestaurantSearchRequest;

    fn kind(&self) -> SearchKind {
        SearchKind::Restaurant
    }

    async fn run(&self, request: RestaurantSearchRequest) -> Result<Value, PipelineError> {
        info!(location = %request.location, "Starting restaurant search");
        let url = self.resolve_url(&request).await?;
        debug!(url = %url, "Resolved restaurant listing");
        let result = self.extract(&url, &request).await?;
        to_document(&result)
    }
}

/// Picks an entry in a native `<select>` by typing its visible label.
async fn choose_option(
    session: &dyn BrowserSession,
    selector: &str,
    label: &str,
    timeout: Duration,
) -> Result<(), PipelineError> {
    let select = session.wait_for_element(selector, timeout).await?;
    session.type_text(&select, label).await?;
    Ok(())
}

fn restaurant_schema() -> Value {
    json!({
        "type": "object",
        "required": ["restaurant"],
        "properties": {
            "restaurant": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "rating": {"type": "string"},
                    "num_reviews": {"type": "string"},
                    "price_range": {"type": "string"},
                    "address": {"type": "string"},
                    "cuisine": {"type": "string"},
                    "opening_hours": {"type": "string"},
                    "meal_types": {"type": "array", "items": {"type": "string"}},
                    "highlights": {"type": "array", "items": {"type": "string"}}
                }
            }
        }
    })
}
