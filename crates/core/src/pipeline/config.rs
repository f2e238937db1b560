//! Target site configuration.

use serde::{Deserialize, Serialize};

/// Sites the pipelines drive, plus result counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    #[serde(default = "default_flights_url")]
    pub flights_url: String,

    /// Hotel search page; the location is passed as `?q=`.
    #[serde(default = "default_hotels_url")]
    pub hotels_url: String,

    #[serde(default = "default_restaurants_url")]
    pub restaurants_url: String,

    /// Video site root; searches go to `/results?search_query=`.
    #[serde(default = "default_videos_url")]
    pub videos_url: String,

    /// How many hotel options to extract.
    #[serde(default = "default_hotel_count")]
    pub hotel_count: usize,

    /// How many top videos to read transcripts from.
    #[serde(default = "default_video_count")]
    pub video_count: usize,
}

fn default_flights_url() -> String {
    "https://www.google.com/travel/flights".to_string()
}

fn default_hotels_url() -> String {
    "https://www.google.com/travel/search".to_string()
}

fn default_restaurants_url() -> String {
    "https://www.opentable.com/".to_string()
}

fn default_videos_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_hotel_count() -> usize {
    4
}

fn default_video_count() -> usize {
    3
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            flights_url: default_flights_url(),
            hotels_url: default_hotels_url(),
            restaurants_url: default_restaurants_url(),
            videos_url: default_videos_url(),
            hotel_count: default_hotel_count(),
            video_count: default_video_count(),
        }
    }
}
