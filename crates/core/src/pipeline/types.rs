//! Pipeline result types.
//!
//! Models return loosely typed JSON (numbers as strings, lists as
//! comma-separated text), so the fields here deserialise leniently and the
//! required ones are checked afterwards.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::PipelineError;

/// One leg of a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    #[serde(default, deserialize_with = "text")]
    pub start_time: String,
    #[serde(default, deserialize_with = "text")]
    pub end_time: String,
    #[serde(default, deserialize_with = "text")]
    pub origin: String,
    #[serde(default, deserialize_with = "text")]
    pub destination: String,
    #[serde(default, deserialize_with = "text")]
    pub price: String,
    #[serde(default, deserialize_with = "count")]
    pub num_stops: u32,
    /// Formatted as "Xh Ym".
    #[serde(default, deserialize_with = "text")]
    pub duration: String,
    #[serde(default, deserialize_with = "text")]
    pub airline: String,
    #[serde(default, deserialize_with = "text")]
    pub stop_locations: String,
}

impl FlightLeg {
    fn check(&self, leg: &str) -> Result<(), PipelineError> {
        let missing: Vec<&str> = [
            ("price", &self.price),
            ("duration", &self.duration),
            ("airline", &self.airline),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Extraction(format!(
                "{} is missing {}",
                leg,
                missing.join(", ")
            )))
        }
    }
}

/// Both legs of a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightResult {
    pub outbound_flight: FlightLeg,
    pub return_flight: FlightLeg,
}

impl FlightResult {
    /// Builds a result from extracted JSON, requiring both complete legs.
    pub fn from_extracted(value: Value) -> Result<Self, PipelineError> {
        #[derive(Deserialize)]
        struct Partial {
            outbound_flight: Option<FlightLeg>,
            return_flight: Option<FlightLeg>,
        }

        let partial: Partial = serde_json::from_value(value)
            .map_err(|e| PipelineError::Extraction(format!("flight result: {}", e)))?;

        let (outbound_flight, return_flight) = match (partial.outbound_flight, partial.return_flight) {
            (Some(outbound), Some(ret)) => (outbound, ret),
            (outbound, ret) => {
                let found = usize::from(outbound.is_some()) + usize::from(ret.is_some());
                return Err(PipelineError::Extraction(format!(
                    "expected outbound and return flights, found {} of 2",
                    found
                )));
            }
        };

        outbound_flight.check("outbound_flight")?;
        return_flight.check("return_flight")?;

        Ok(Self {
            outbound_flight,
            return_flight,
        })
    }
}

/// One hotel option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelOption {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub price_per_night: String,
    #[serde(default, deserialize_with = "text")]
    pub total_price: String,
    #[serde(default, deserialize_with = "text")]
    pub rating: String,
    #[serde(default, deserialize_with = "text")]
    pub address: String,
    #[serde(default, deserialize_with = "text_list")]
    pub amenities: Vec<String>,
    #[serde(default, deserialize_with = "text")]
    pub check_in: String,
    #[serde(default, deserialize_with = "text")]
    pub check_out: String,
}

/// Hotel options for a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelResult {
    pub hotels: Vec<HotelOption>,
}

impl HotelResult {
    /// Accepts `{"hotels": [...]}` or a bare list. Unnamed entries are
    /// dropped and at most `limit` are kept; none left is an error.
    pub fn from_extracted(value: Value, limit: usize) -> Result<Self, PipelineError> {
        let list = match value {
            Value::Object(mut map) => map.remove("hotels").unwrap_or(Value::Null),
            other => other,
        };

        let hotels: Vec<HotelOption> = serde_json::from_value(list)
            .map_err(|e| PipelineError::Extraction(format!("hotel list: {}", e)))?;

        let hotels: Vec<HotelOption> = hotels
            .into_iter()
            .filter(|h| !h.name.trim().is_empty())
            .take(limit)
            .collect();

        if hotels.is_empty() {
            return Err(PipelineError::Extraction("no hotels found".to_string()));
        }
        Ok(Self { hotels })
    }
}

/// The best-matching restaurant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantOption {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub rating: String,
    #[serde(default, deserialize_with = "text")]
    pub num_reviews: String,
    #[serde(default, deserialize_with = "text")]
    pub price_range: String,
    #[serde(default, deserialize_with = "text")]
    pub address: String,
    #[serde(default, deserialize_with = "text")]
    pub cuisine: String,
    #[serde(default, deserialize_with = "text")]
    pub opening_hours: String,
    #[serde(default, deserialize_with = "text_list")]
    pub meal_types: Vec<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantResult {
    pub restaurant: RestaurantOption,
}

impl RestaurantResult {
    /// Accepts `{"restaurant": {...}}`, a bare object, or a list (first entry wins).
    pub fn from_extracted(value: Value) -> Result<Self, PipelineError> {
        let entry = match value {
            Value::Object(mut map) if map.contains_key("restaurant") => {
                map.remove("restaurant").unwrap_or(Value::Null)
            }
            Value::Array(list) => list.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };

        let restaurant: RestaurantOption = serde_json::from_value(entry)
            .map_err(|e| PipelineError::Extraction(format!("restaurant: {}", e)))?;

        if restaurant.name.trim().is_empty() {
            return Err(PipelineError::Extraction(
                "no matching restaurant found".to_string(),
            ));
        }
        Ok(Self { restaurant })
    }
}

/// A video whose transcript grounded the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    pub url: String,
    pub video_id: String,
    /// Whether a transcript could be read for this video.
    pub transcript_found: bool,
}

/// Answer to a video review question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    /// Search title derived from the question.
    pub title: String,
    pub videos: Vec<VideoSource>,
    pub answer: String,
}

// ============================================================================
// Lenient deserialisers
// ============================================================================

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn text_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(value_to_text).collect(),
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        other => vec![other.to_string()],
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

/// Stop counts come back as `1`, `"1 stop"`, or `"Nonstop"`.
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leg(price: &str) -> Value {
        json!({
            "start_time": "08:00",
            "end_time": "14:30",
            "origin": "HAN",
            "destination": "CDG",
            "price": price,
            "num_stops": "1 stop",
            "duration": "13h 30m",
            "airline": "Vietnam Airlines",
            "stop_locations": ["Bangkok", "BKK"]
        })
    }

    #[test]
    fn test_flight_result_complete() {
        let result = FlightResult::from_extracted(json!({
            "outbound_flight": leg("$650"),
            "return_flight": leg("$700"),
        }))
        .unwrap();
        assert_eq!(result.outbound_flight.num_stops, 1);
        assert_eq!(result.outbound_flight.stop_locations, "Bangkok, BKK");
        assert_eq!(result.return_flight.price, "$700");
    }

    #[test]
    fn test_flight_result_single_leg_fails() {
        let err = FlightResult::from_extracted(json!({ "outbound_flight": leg("$650") }))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
        assert!(err.to_string().contains("found 1 of 2"));
    }

    #[test]
    fn test_flight_result_empty_price_fails() {
        let err = FlightResult::from_extracted(json!({
            "outbound_flight": leg("$650"),
            "return_flight": leg(""),
        }))
        .unwrap_err();
        assert!(err.to_string().contains("return_flight is missing price"));
    }

    #[test]
    fn test_hotel_result_truncates_and_filters() {
        let value = json!({"hotels": [
            {"name": "A", "price_per_night": 120, "amenities": "Pool, Wifi"},
            {"name": ""},
            {"name": "B"},
            {"name": "C"},
        ]});
        let result = HotelResult::from_extracted(value, 2).unwrap();
        assert_eq!(result.hotels.len(), 2);
        assert_eq!(result.hotels[0].price_per_night, "120");
        assert_eq!(result.hotels[0].amenities, vec!["Pool", "Wifi"]);
        assert_eq!(result.hotels[1].name, "B");
    }

    #[test]
    fn test_hotel_result_accepts_bare_list() {
        let result = HotelResult::from_extracted(json!([{"name": "Solo"}]), 4).unwrap();
        assert_eq!(result.hotels[0].name, "Solo");
    }

    #[test]
    fn test_hotel_result_empty_fails() {
        assert!(HotelResult::from_extracted(json!({"hotels": []}), 4).is_err());
        assert!(HotelResult::from_extracted(json!({"other": 1}), 4).is_err());
    }

    #[test]
    fn test_restaurant_result_shapes() {
        let wrapped =
            RestaurantResult::from_extracted(json!({"restaurant": {"name": "Le Bernardin"}}))
                .unwrap();
        assert_eq!(wrapped.restaurant.name, "Le Bernardin");

        let bare = RestaurantResult::from_extracted(json!({"name": "Pizza Place", "rating": 4.5}))
            .unwrap();
        assert_eq!(bare.restaurant.rating, "4.5");

        let list = RestaurantResult::from_extracted(json!([{"name": "First"}, {"name": "Second"}]))
            .unwrap();
        assert_eq!(list.restaurant.name, "First");

        assert!(RestaurantResult::from_extracted(json!({})).is_err());
    }

    #[test]
    fn test_count_parsing() {
        let leg: FlightLeg = serde_json::from_value(json!({"num_stops": "Nonstop"})).unwrap();
        assert_eq!(leg.num_stops, 0);
        let leg: FlightLeg = serde_json::from_value(json!({"num_stops": 2})).unwrap();
        assert_eq!(leg.num_stops, 2);
    }
}
