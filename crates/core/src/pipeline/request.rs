//! Search request types and validation.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A search request was missing required fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required parameters. Please provide {0}")]
pub struct ValidationError(pub &'static str);

/// Free-form user preferences, forwarded to the extraction step.
pub type Preferences = Map<String, Value>;

/// Flight search: round trip between two places.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination: String,
    /// Departure date, as a calendar label or `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    /// Return date, as a calendar label or `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferences: Preferences,
}

/// Hotel search for a stay in one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelSearchRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_in: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_out: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferences: Preferences,
}

/// Restaurant search. Only the location is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSearchRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferences: Preferences,
}

/// Video review question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoSearchRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_input: String,
}

impl FlightSearchRequest {
    /// Trims fields, normalises date labels, and checks required fields.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let request = Self {
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
            start_date: calendar_label(&self.start_date),
            end_date: calendar_label(&self.end_date),
            preferences: self.preferences,
        };

        if [
            &request.origin,
            &request.destination,
            &request.start_date,
            &request.end_date,
        ]
        .iter()
        .any(|f| f.is_empty())
        {
            return Err(ValidationError(
                "origin, destination, start_date and end_date",
            ));
        }
        Ok(request)
    }
}

impl HotelSearchRequest {
    /// Trims fields, normalises date labels, and checks required fields.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let request = Self {
            location: self.location.trim().to_string(),
            check_in: calendar_label(&self.check_in),
            check_out: calendar_label(&self.check_out),
            preferences: self.preferences,
        };

        if request.location.is_empty() || request.check_in.is_empty() || request.check_out.is_empty()
        {
            return Err(ValidationError("location, check_in and check_out"));
        }
        Ok(request)
    }
}

impl RestaurantSearchRequest {
    /// Trims fields and drops blank optional values.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let request = Self {
            location: self.location.trim().to_string(),
            date: non_blank(self.date).map(|d| calendar_label(&d)),
            time: non_blank(self.time),
            party_size: self.party_size.filter(|n| *n > 0),
            preferences: self.preferences,
        };

        if request.location.is_empty() {
            return Err(ValidationError("location"));
        }
        Ok(request)
    }
}

impl VideoSearchRequest {
    pub fn validated(self) -> Result<Self, ValidationError> {
        let user_input = self.user_input.trim().to_string();
        if user_input.is_empty() {
            return Err(ValidationError("user_input (your question)"));
        }
        Ok(Self { user_input })
    }
}

/// Reads JSON `null` as the field's default, so a null required field
/// fails validation like an absent one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Formats a date the way booking sites label calendar cells.
///
/// `YYYY-MM-DD` becomes `"Thursday, May 1, 2025"`. Anything else is assumed
/// to already be a label and only loses zero padding on the day
/// (`"Sunday, May 04, 2025"` becomes `"Sunday, May 4, 2025"`).
pub fn calendar_label(date: &str) -> String {
    let date = date.trim();
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%A, %B %-d, %Y").to_string(),
        Err(_) => date.replace(" 0", " "),
    }
}
