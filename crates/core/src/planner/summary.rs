//! Readable summaries of search results.

use serde_json::Value;
use std::sync::Arc;

use super::PlannerError;
use crate::llm::{CompletionRequest, LlmClient};

/// Writes Markdown recommendations from raw search results.
pub struct TravelSummarizer {
    llm: Arc<dyn LlmClient>,
}

impl TravelSummarizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Recommends one outbound and one return flight and totals the price.
    pub async fn summarize_flights(
        &self,
        flights: &Value,
        requirements: &str,
    ) -> Result<String, PlannerError> {
        let prompt = format!(
            "Summarize the following flights as nicely formatted output.\n\n\
             Flights: {}\n\n\
             Recommend the best single outbound flight and the best single return flight \
             for these requirements: {}\n\n\
             Give the total price as the sum of the outbound and return prices. If both \
             prices are the same, treat that price as the round-trip total.\n\
             Use only basic Markdown.",
            flights, requirements
        );
        self.complete(prompt).await
    }

    /// Recommends one hotel and works out the cost of the stay.
    pub async fn summarize_hotels(
        &self,
        hotels: &Value,
        requirements: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<String, PlannerError> {
        let prompt = format!(
            "Summarize the following hotels, including the total price for the stay, as \
             nicely formatted output.\n\n\
             Hotels: {}\n\n\
             Recommend the best hotel for these requirements: {}\n\n\
             The stay runs from {} to {}; compute the total price for that duration.\n\
             Use only basic Markdown.",
            hotels, requirements, check_in, check_out
        );
        self.complete(prompt).await
    }

    async fn complete(&self, prompt: String) -> Result<String, PlannerError> {
        let response = self
            .llm
            .complete(CompletionRequest::new(prompt).with_max_tokens(1024))
            .await?;
        Ok(response.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockLlm};

    #[tokio::test]
    async fn test_flight_summary_prompt() {
        let llm = MockLlm::new();
        llm.push_reply("  **Outbound:** Vietnam Airlines  ").await;
        let summarizer = TravelSummarizer::new(Arc::new(llm.clone()));

        let summary = summarizer
            .summarize_flights(&fixtures::flight_result(), "economy, under $800")
            .await
            .unwrap();

        assert_eq!(summary, "**Outbound:** Vietnam Airlines");
        let prompt = &llm.recorded_prompts().await[0];
        assert!(prompt.contains("economy, under $800"));
        assert!(prompt.contains("13h 35m"));
    }

    #[tokio::test]
    async fn test_hotel_summary_includes_stay() {
        let llm = MockLlm::new();
        llm.push_reply("Riverside Hotel is the pick.").await;
        let summarizer = TravelSummarizer::new(Arc::new(llm.clone()));

        summarizer
            .summarize_hotels(
                &fixtures::hotel_result(),
                "pool",
                "Thursday, May 1, 2025",
                "Sunday, May 4, 2025",
            )
            .await
            .unwrap();

        let prompt = &llm.recorded_prompts().await[0];
        assert!(prompt.contains("from Thursday, May 1, 2025 to Sunday, May 4, 2025"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = MockLlm::new();
        llm.push_error("overloaded").await;
        let summarizer = TravelSummarizer::new(Arc::new(llm));
        let err = summarizer
            .summarize_flights(&fixtures::flight_result(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::Llm(_)));
    }
}
