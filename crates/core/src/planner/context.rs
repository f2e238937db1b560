//! Running trip context shared between searches and the research chat.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::{FlightSearchRequest, HotelSearchRequest};

/// Placeholder for anything the traveller has not told us yet.
pub const NOT_SPECIFIED: &str = "Not specified";

/// What is known about the trip so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelContext {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    /// Human-readable flight findings, usually a summary.
    pub flights: String,
    pub hotels: String,
}

impl Default for TravelContext {
    fn default() -> Self {
        Self {
            origin: NOT_SPECIFIED.to_string(),
            destination: NOT_SPECIFIED.to_string(),
            start_date: NOT_SPECIFIED.to_string(),
            end_date: NOT_SPECIFIED.to_string(),
            flights: NOT_SPECIFIED.to_string(),
            hotels: NOT_SPECIFIED.to_string(),
        }
    }
}

impl TravelContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_destination(&self) -> bool {
        self.destination != NOT_SPECIFIED && !self.destination.trim().is_empty()
    }

    /// Records a completed flight search. `findings` is either a summary
    /// string or the raw result document.
    pub fn record_flights(&mut self, request: &FlightSearchRequest, findings: &Value) {
        self.origin = request.origin.clone();
        self.destination = request.destination.clone();
        self.start_date = request.start_date.clone();
        self.end_date = request.end_date.clone();
        self.flights = describe(findings);
    }

    /// Records a completed hotel search. The stay dates fill in trip dates
    /// only when no flight search set them.
    pub fn record_hotels(&mut self, request: &HotelSearchRequest, findings: &Value) {
        if !self.has_destination() {
            self.destination = request.location.clone();
        }
        if self.start_date == NOT_SPECIFIED {
            self.start_date = request.check_in.clone();
        }
        if self.end_date == NOT_SPECIFIED {
            self.end_date = request.check_out.clone();
        }
        self.hotels = describe(findings);
    }

    /// Opening message for the research conversation.
    pub fn memory_prompt(&self) -> String {
        format!(
            "I am your travel assistant. I have access to your travel details:\n\
             - Flight from {} to {}\n\
             - Travel dates: {} to {}\n\n\
             Flight details: {}\n\
             Hotel details: {}",
            self.origin, self.destination, self.start_date, self.end_date, self.flights, self.hotels
        )
    }
}

fn describe(findings: &Value) -> String {
    match findings {
        Value::String(text) => text.clone(),
        Value::Null => NOT_SPECIFIED.to_string(),
        other => other.to_string(),
    }
}
