//! Round-trip flight search.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::error::PipelineError;
use super::request::FlightSearchRequest;
use super::session::{click_when_ready, css_string, fill_input};
use super::types::FlightResult;
use super::{to_document, PipelineDeps, SearchPipeline};
use crate::browser::{BrowserSession, SessionGuard};
use crate::task::SearchKind;

const DESTINATION_INPUT: &str = r#"input[aria-label="Where to? "]"#;
const ORIGIN_INPUT: &str = r#"input[aria-label="Where from?"]"#;
const DEPARTURE_INPUT: &str = r#"input[aria-label*="Departure"]"#;
const RETURN_INPUT: &str = r#"input[aria-label*="Return"]"#;
const DONE_BUTTON: &str = r#"button[aria-label*="Done"]"#;

/// Short settle between form interactions.
const STEP_PAUSE: Duration = Duration::from_millis(500);

/// Searches a flights site, then extracts the best outbound and return legs.
pub struct FlightPipeline {
    deps: PipelineDeps,
}

impl FlightPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self { deps }
    }

    /// Phase 1: fill the search form and return the listing URL.
    pub async fn resolve_url(&self, request: &FlightSearchRequest) -> Result<String, PipelineError> {
        let session = SessionGuard::new(self.deps.browser.open_session().await?);
        let result = self.fill_search(session.session(), request).await;
        session.close().await;
        result
    }

    async fn fill_search(
        &self,
        session: &dyn BrowserSession,
        request: &FlightSearchRequest,
    ) -> Result<String, PipelineError> {
        let timeout = self.deps.browser_config.element_timeout();
        let settle = self.deps.browser_config.page_load_wait();

        session.navigate(&self.deps.sites.flights_url).await?;
        session.pause(settle).await;

        // Destination first: filling it collapses the origin suggestions.
        self.select_airport(session, DESTINATION_INPUT, &request.destination)
            .await?;
        self.select_airport(session, ORIGIN_INPUT, &request.origin)
            .await?;

        debug!(start = %request.start_date, end = %request.end_date, "Filling travel dates");
        click_when_ready(session, DEPARTURE_INPUT, timeout).await?;
        session.pause(STEP_PAUSE).await;
        click_when_ready(session, &date_cell(&request.start_date), timeout).await?;
        session.pause(STEP_PAUSE).await;

        let return_input = session.wait_for_element(RETURN_INPUT, timeout).await?;
        click_when_ready(session, &date_cell(&request.end_date), timeout).await?;
        session.pause(STEP_PAUSE).await;
        session.press_enter(&return_input).await?;
        session.pause(STEP_PAUSE).await;

        // The date picker only sometimes needs confirming.
        if let Some(done) = session.find_all(DONE_BUTTON).await?.first() {
            session.click(done).await?;
        }
        session.pause(settle).await;

        Ok(session.current_url().await?)
    }

    async fn select_airport(
        &self,
        session: &dyn BrowserSession,
        input: &str,
        name: &str,
    ) -> Result<(), PipelineError> {
        let timeout = self.deps.browser_config.element_timeout();
        fill_input(session, input, name, timeout).await?;
        session.pause(STEP_PAUSE).await;

        let option = format!(r#"li[role="option"][aria-label*="{}"]"#, css_string(name));
        click_when_ready(session, &option, timeout)
            .await
            .map_err(|e| PipelineError::Navigation(format!("could not select airport {}: {}", name, e)))?;
        session.pause(STEP_PAUSE).await;
        Ok(())
    }

    /// Phase 2: extract both legs from the listing.
    pub async fn extract(
        &self,
        url: &str,
        request: &FlightSearchRequest,
    ) -> Result<FlightResult, PipelineError> {
        let instructions = format!(
            "Pick the best outbound flight, then the best return flight, for these \
             preferences: {}. Report both legs. Write durations as \"Xh Ym\".",
            Value::Object(request.preferences.clone())
        );
        let value = self
            .deps
            .extractor
            .extract(url, &flight_schema(), &instructions)
            .await?;
        FlightResult::from_extracted(value)
    }
}

#[async_trait]
impl SearchPipeline for FlightPipeline {
    type Request = FlightSearchRequest;

    fn kind(&self) -> SearchKind {
        SearchKind::Flight
    }

    async fn run(&self, request: FlightSearchRequest) -> Result<Value, PipelineError> {
        info!(origin = %request.origin, destination = %request.destination, "Starting flight search");
        let url = self.resolve_url(&request).await?;
        debug!(url = %url, "Resolved flight listing");
        let result = self.extract(&url, &request).await?;
        to_document(&result)
    }
}

fn date_cell(label: &str) -> String {
    format!(r#"div[aria-label="{}"]"#, css_string(label))
}

fn flight_schema() -> Value {
    let leg = json!({
        "type": "object",
        "required": ["start_time", "end_time", "origin", "destination", "price", "num_stops", "duration", "airline", "stop_locations"],
        "properties": {
            "start_time": {"type": "string"},
            "end_time": {"type": "string"},
            "origin": {"type": "string"},
            "destination": {"type": "string"},
            "price": {"type": "string"},
            "num_stops": {"type": "integer"},
            "duration": {"type": "string"},
            "airline": {"type": "string"},
            "stop_locations": {"type": "string"}
        }
    });
    json!({
        "type": "object",
        "required": ["outbound_flight", "return_flight"],
        "properties": {
            "outbound_flight": leg,
            "return_flight": leg
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, BrowserAction, MockCapabilities};

    fn request() -> FlightSearchRequest {
        FlightSearchRequest {
            origin: "Hanoi".to_string(),
            destination: "Paris".to_string(),
            start_date: "2025-05-01".to_string(),
            end_date: "2025-05-10".to_string(),
            preferences: Default::default(),
        }
        .validated()
        .unwrap()
    }

    #[tokio::test]
    async fn test_flight_pipeline_success() {
        let mocks = MockCapabilities::new();
        mocks
            .browser
            .set_current_url("https://flights.example/search?tfs=abc")
            .await;
        mocks.extractor.push_result(fixtures::flight_result()).await;

        let pipeline = FlightPipeline::new(mocks.deps());
        let data = pipeline.run(request()).await.unwrap();

        assert_eq!(data["outbound_flight"]["airline"], "Vietnam Airlines");
        assert_eq!(data["return_flight"]["duration"], "13h 5m");

        let calls = mocks.extractor.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://flights.example/search?tfs=abc");
        assert_eq!(mocks.browser.sessions_closed().await, 1);
    }

    #[tokio::test]
    async fn test_fills_destination_before_origin_and_dates() {
        let mocks = MockCapabilities::new();
        mocks.extractor.push_result(fixtures::flight_result()).await;
        let pipeline = FlightPipeline::new(mocks.deps());
        pipeline.run(request()).await.unwrap();

        let typed: Vec<String> = mocks
            .browser
            .actions()
            .await
            .into_iter()
            .filter_map(|a| match a {
                BrowserAction::Type { text, .. } => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(typed, vec!["Paris", "Hanoi"]);

        let clicks: Vec<String> = mocks
            .browser
            .actions()
            .await
            .into_iter()
            .filter_map(|a| match a {
                BrowserAction::Click(selector) => Some(selector),
                _ => None,
            })
            .collect();
        assert!(clicks.contains(&r#"div[aria-label="Thursday, May 1, 2025"]"#.to_string()));
        assert!(clicks.contains(&r#"div[aria-label="Saturday, May 10, 2025"]"#.to_string()));
    }

    #[tokio::test]
    async fn test_missing_field_is_navigation_error_and_session_closed() {
        let mocks = MockCapabilities::new();
        mocks.browser.set_missing("Where from?").await;

        let pipeline = FlightPipeline::new(mocks.deps());
        let err = pipeline.run(request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Navigation(_)));
        assert_eq!(mocks.browser.sessions_opened().await, 1);
        assert_eq!(mocks.browser.sessions_closed().await, 1);
        assert!(mocks.extractor.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_single_leg_is_failure() {
        let mocks = MockCapabilities::new();
        let mut partial = fixtures::flight_result();
        partial.as_object_mut().unwrap().remove("return_flight");
        mocks.extractor.push_result(partial).await;

        let pipeline = FlightPipeline::new(mocks.deps());
        let err = pipeline.run(request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }
}
