//! Testing utilities and mock implementations.
//!
//! Every external collaborator (browser, extractor, LLM, transcripts, web
//! search) has a mock here, so pipelines and the HTTP API can be exercised
//! end to end without a browser or network.
//!
//! # Example
//!
//! ```rust,ignore
//! use tripscout_core::testing::{fixtures, MockCapabilities};
//!
//! let mocks = MockCapabilities::new();
//! mocks.extractor.push_result(fixtures::flight_result()).await;
//!
//! let pipelines = Pipelines::new(mocks.deps());
//! ```

mod mock_browser;
mod mock_extractor;
mod mock_llm;
mod mock_search_tool;
mod mock_transcripts;

pub use mock_browser::{BrowserAction, MockBrowser};
pub use mock_extractor::{MockExtractor, RecordedExtraction};
pub use mock_llm::MockLlm;
pub use mock_search_tool::MockSearchTool;
pub use mock_transcripts::MockTranscripts;

use std::sync::Arc;

use crate::browser::BrowserConfig;
use crate::pipeline::{PipelineDeps, SitesConfig};

/// One mock of each pipeline collaborator.
///
/// Clones share state, so a test can keep a handle while the pipelines
/// own another.
#[derive(Debug, Clone, Default)]
pub struct MockCapabilities {
    pub browser: MockBrowser,
    pub extractor: MockExtractor,
    pub llm: MockLlm,
    pub transcripts: MockTranscripts,
}

impl MockCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline collaborators backed by these mocks, with default sites.
    pub fn deps(&self) -> PipelineDeps {
        self.deps_with_sites(SitesConfig::default())
    }

    pub fn deps_with_sites(&self, sites: SitesConfig) -> PipelineDeps {
        PipelineDeps {
            browser: Arc::new(self.browser.clone()),
            extractor: Arc::new(self.extractor.clone()),
            llm: Arc::new(self.llm.clone()),
            transcripts: Arc::new(self.transcripts.clone()),
            browser_config: BrowserConfig::default(),
            sites,
        }
    }
}

/// Extraction payloads shaped the way a model returns them.
pub mod fixtures {
    use serde_json::{json, Value};

    /// A complete round trip, Hanoi to Paris.
    pub fn flight_result() -> Value {
        json!({
            "outbound_flight": {
                "start_time": "23:45",
                "end_time": "07:20+1",
                "origin": "HAN",
                "destination": "CDG",
                "price": "$712",
                "num_stops": 0,
                "duration": "13h 35m",
                "airline": "Vietnam Airlines",
                "stop_locations": ""
            },
            "return_flight": {
                "start_time": "13:30",
                "end_time": "07:35+1",
                "origin": "CDG",
                "destination": "HAN",
                "price": "$712",
                "num_stops": "Nonstop",
                "duration": "13h 5m",
                "airline": "Vietnam Airlines",
                "stop_locations": []
            }
        })
    }

    /// Four hotels plus one entry the model left unnamed.
    pub fn hotel_result() -> Value {
        let hotel = |name: &str, nightly: u32| {
            json!({
                "name": name,
                "price_per_night": format!("${}", nightly),
                "total_price": format!("${}", nightly * 3),
                "rating": "4.5",
                "address": "District 1, Ho Chi Minh City",
                "amenities": ["Free Wi-Fi", "Pool"],
                "check_in": "2:00 PM",
                "check_out": "12:00 PM"
            })
        };
        json!({
            "hotels": [
                hotel("Riverside Hotel", 85),
                {"name": "", "price_per_night": "$10"},
                hotel("Saigon Central", 70),
                hotel("Lotus Boutique", 95),
                hotel("Ben Thanh Suites", 60),
                hotel("Opera View", 120)
            ]
        })
    }

    pub fn restaurant_result() -> Value {
        json!({
            "restaurant": {
                "name": "Pizzeria Paradiso",
                "rating": "4.6",
                "num_reviews": "2,134",
                "price_range": "$$",
                "address": "2003 P St NW, Washington, DC",
                "cuisine": "Pizza",
                "opening_hours": "11:30 AM - 10:00 PM",
                "meal_types": "Lunch, Dinner",
                "highlights": ["Outdoor seating", "Craft beer"]
            }
        })
    }
}
