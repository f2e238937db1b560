//! Free-text trip descriptions to structured search requests.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::PlannerError;
use crate::llm::{parse_json_reply, CompletionRequest, LlmClient};
use crate::pipeline::{
    calendar_label, FlightSearchRequest, HotelSearchRequest, Preferences, RestaurantSearchRequest,
};

/// Flight details pulled out of a description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFlightDetails {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub ticket_class: Option<String>,
    #[serde(default)]
    pub airline: Option<String>,
}

/// Hotel details pulled out of a description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedHotelDetails {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub price_per_night: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub amenities: Option<String>,
}

/// Restaurant details pulled out of a description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRestaurantDetails {
    #[serde(default)]
    pub location: Option<String>,
    /// `"Thursday, April 17, 2025"` once the weekday has been corrected.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub party_size: Option<u32>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
}

impl ParsedFlightDetails {
    pub fn into_search_request(self) -> Result<FlightSearchRequest, PlannerError> {
        let (origin, destination) = match (present(self.origin), present(self.destination)) {
            (Some(o), Some(d)) => (o, d),
            _ => return Err(PlannerError::MissingAirports),
        };
        let (start_date, end_date) = match (present(self.start_date), present(self.end_date)) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(PlannerError::MissingDates),
        };

        let mut preferences = Preferences::new();
        insert(&mut preferences, "budget", self.budget);
        insert(&mut preferences, "ticket_class", self.ticket_class);
        insert(&mut preferences, "airline", self.airline);

        Ok(FlightSearchRequest {
            origin,
            destination,
            start_date,
            end_date,
            preferences,
        })
    }
}

impl ParsedHotelDetails {
    pub fn into_search_request(self) -> Result<HotelSearchRequest, PlannerError> {
        let location = present(self.location).ok_or(PlannerError::MissingLocation)?;
        let (check_in, check_out) = match (present(self.check_in), present(self.check_out)) {
            (Some(i), Some(o)) => (i, o),
            _ => return Err(PlannerError::MissingDates),
        };

        let mut preferences = Preferences::new();
        insert(&mut preferences, "price_per_night", self.price_per_night);
        insert(&mut preferences, "rating", self.rating);
        insert(&mut preferences, "amenities", self.amenities);

        Ok(HotelSearchRequest {
            location,
            check_in: calendar_label(&check_in),
            check_out: calendar_label(&check_out),
            preferences,
        })
    }
}

impl ParsedRestaurantDetails {
    pub fn into_search_request(self) -> Result<RestaurantSearchRequest, PlannerError> {
        let location = present(self.location).ok_or(PlannerError::MissingLocation)?;

        let mut preferences = Preferences::new();
        insert(&mut preferences, "cuisine", self.cuisine);
        insert(&mut preferences, "rating", self.rating);
        insert(&mut preferences, "price_range", self.price_range);

        Ok(RestaurantSearchRequest {
            location,
            date: present(self.date),
            time: present(self.time),
            party_size: self.party_size,
            preferences,
        })
    }
}

/// Turns descriptions like "Hanoi to Paris on May 1, back on the 10th"
/// into search requests using an LLM.
pub struct RequestParser {
    llm: Arc<dyn LlmClient>,
    reference_year: i32,
}

impl RequestParser {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            reference_year: Utc::now().year(),
        }
    }

    /// Year assumed for dates given without one.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub async fn parse_flight(&self, text: &str) -> Result<ParsedFlightDetails, PlannerError> {
        let format = r#"{"origin": string, "destination": string, "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD", "budget": string or null, "ticket_class": string or null, "airline": string or null}"#;
        let mut details: ParsedFlightDetails = self
            .ask("Extract the flight search details from the traveller's input.", format, text)
            .await?;

        details.start_date = details.start_date.map(|d| calendar_label(&d));
        details.end_date = details.end_date.map(|d| calendar_label(&d));
        Ok(details)
    }

    pub async fn parse_hotel(&self, text: &str) -> Result<ParsedHotelDetails, PlannerError> {
        let format = r#"{"location": string, "check_in": "YYYY-MM-DD", "check_out": "YYYY-MM-DD", "price_per_night": string or null (with currency), "rating": string or null, "amenities": string or null}"#;
        self.ask("Extract the most relevant hotel details from the text.", format, text)
            .await
    }

    pub async fn parse_restaurant(
        &self,
        text: &str,
    ) -> Result<ParsedRestaurantDetails, PlannerError> {
        let format = r#"{"location": string, "date": "Day, Month DD" or null (e.g. "Thursday, April 17"), "time": "H:MM AM/PM" or null, "party_size": integer or null, "cuisine": string or null, "rating": string or null, "price_range": string or null}"#;
        let mut details: ParsedRestaurantDetails = self
            .ask("Extract the most relevant restaurant reservation details from the text.", format, text)
            .await?;

        details.date = details.date.map(|d| self.correct_weekday(&d));
        Ok(details)
    }

    async fn ask<T: serde::de::DeserializeOwned>(
        &self,
        task: &str,
        format: &str,
        text: &str,
    ) -> Result<T, PlannerError> {
        let prompt = format!(
            "{}\nReply with a single JSON object in this format and nothing else:\n{}\n\nInput:\n{}",
            task, format, text
        );
        let response = self
            .llm
            .complete(CompletionRequest::new(prompt).with_max_tokens(512))
            .await?;
        debug!(reply = %response.text, "Parsed planner request");

        Ok(parse_json_reply(&response.text)?)
    }

    /// Models get weekdays wrong. Recomputes the weekday of `"Day, Month DD"`
    /// (or ISO dates) in the reference year and appends the year.
    fn correct_weekday(&self, label: &str) -> String {
        let label = label.trim();
        if let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
            return calendar_label(&date.to_string());
        }

        let month_day = match label.split_once(", ") {
            Some((_, rest)) => rest,
            None => label,
        };
        let with_year = format!("{}, {}", month_day, self.reference_year);
        match NaiveDate::parse_from_str(&with_year, "%B %d, %Y") {
            Ok(date) => date.format("%A, %B %-d, %Y").to_string(),
            Err(_) => label.to_string(),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

fn insert(preferences: &mut Preferences, key: &str, value: Option<String>) {
    if let Some(value) = present(value) {
        preferences.insert(key.to_string(), Value::String(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlm;

    fn parser(llm: &MockLlm) -> RequestParser {
        RequestParser::new(Arc::new(llm.clone())).with_reference_year(2025)
    }

    #[tokio::test]
    async fn test_parse_flight_reformats_dates() {
        let llm = MockLlm::new();
        llm.push_reply(
            "```json\n{\"origin\": \"New York\", \"destination\": \"Paris\", \
             \"start_date\": \"2025-05-20\", \"end_date\": \"2025-05-25\", \
             \"ticket_class\": \"economy\", \"airline\": \"Air France\", \"budget\": null}\n```",
        )
        .await;

        let details = parser(&llm)
            .parse_flight("New York to Paris May 20 to 25, economy on Air France")
            .await
            .unwrap();
        assert_eq!(details.start_date.as_deref(), Some("Tuesday, May 20, 2025"));
        assert_eq!(details.end_date.as_deref(), Some("Sunday, May 25, 2025"));

        let request = details.into_search_request().unwrap();
        assert_eq!(request.origin, "New York");
        assert_eq!(request.preferences["airline"], "Air France");
        assert!(!request.preferences.contains_key("budget"));

        let prompts = llm.recorded_prompts().await;
        assert!(prompts[0].contains("New York to Paris May 20 to 25"));
    }

    #[tokio::test]
    async fn test_unparseable_dates_left_untouched() {
        let llm = MockLlm::new();
        llm.push_reply(
            r#"{"origin": "Hanoi", "destination": "Tokyo", "start_date": "early June", "end_date": "mid June"}"#,
        )
        .await;
        let details = parser(&llm).parse_flight("Hanoi to Tokyo in June").await.unwrap();
        assert_eq!(details.start_date.as_deref(), Some("early June"));
    }

    #[tokio::test]
    async fn test_flight_without_destination() {
        let llm = MockLlm::new();
        llm.push_reply(r#"{"origin": "Hanoi", "start_date": "2025-06-01", "end_date": "2025-06-09"}"#)
            .await;
        let details = parser(&llm).parse_flight("Leaving Hanoi in June").await.unwrap();
        assert!(matches!(
            details.into_search_request(),
            Err(PlannerError::MissingAirports)
        ));
    }

    #[tokio::test]
    async fn test_parse_hotel() {
        let llm = MockLlm::new();
        llm.push_reply(
            r#"{"location": "Paris", "check_in": "2025-05-20", "check_out": "2025-05-25", "price_per_night": "under 3,000,000 VND", "rating": "4 stars or higher"}"#,
        )
        .await;
        let request = parser(&llm)
            .parse_hotel("Paris stay")
            .await
            .unwrap()
            .into_search_request()
            .unwrap();
        assert_eq!(request.check_in, "Tuesday, May 20, 2025");
        assert_eq!(request.preferences["rating"], "4 stars or higher");
    }

    #[tokio::test]
    async fn test_hotel_without_dates() {
        let details = ParsedHotelDetails {
            location: Some("Paris".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            details.into_search_request(),
            Err(PlannerError::MissingDates)
        ));
    }

    #[tokio::test]
    async fn test_parse_restaurant_corrects_weekday() {
        let llm = MockLlm::new();
        llm.push_reply(
            r#"{"location": "Washington", "date": "Tuesday, April 17", "time": "6:00 PM", "party_size": 3, "cuisine": "pizza"}"#,
        )
        .await;
        let details = parser(&llm).parse_restaurant("pizza for three").await.unwrap();
        assert_eq!(details.date.as_deref(), Some("Thursday, April 17, 2025"));

        let request = details.into_search_request().unwrap();
        assert_eq!(request.party_size, Some(3));
        assert_eq!(request.preferences["cuisine"], "pizza");
    }

    #[tokio::test]
    async fn test_non_json_reply() {
        let llm = MockLlm::new();
        llm.push_reply("Sorry, I could not find any trip details.").await;
        let err = parser(&llm).parse_flight("hello").await.unwrap_err();
        assert!(matches!(err, PlannerError::Llm(_)));
    }
}
