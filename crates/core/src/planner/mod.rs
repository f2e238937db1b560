//! Conversational trip-planning helpers built on the LLM.

mod context;
mod parser;
mod research;
mod summary;

pub use context::{TravelContext, NOT_SPECIFIED};
pub use parser::{ParsedFlightDetails, ParsedHotelDetails, ParsedRestaurantDetails, RequestParser};
pub use research::{ChatRole, ChatTurn, ResearchAssistant, SuggestedPrompts};
pub use summary::TravelSummarizer;

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Could not work out both the origin and the destination")]
    MissingAirports,

    #[error("Could not work out the travel dates")]
    MissingDates,

    #[error("Could not work out the location")]
    MissingLocation,

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),
}
