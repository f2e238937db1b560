//! HTTP client for the task API, with status polling.

mod poll;

pub use poll::PollOptions;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::pipeline::{
    FlightSearchRequest, HotelSearchRequest, RestaurantSearchRequest, VideoSearchRequest,
};
use crate::task::TaskState;

/// Errors seen by API clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the request (validation, overload).
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Gave up waiting after {0:?}")]
    Timeout(Duration),

    #[error("Polling cancelled")]
    Cancelled,

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct Accepted {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the travel task API.
#[derive(Debug, Clone)]
pub struct TravelApiClient {
    client: Client,
    base_url: String,
}

impl TravelApiClient {
    /// Default per-request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a flight search and returns its task id.
    pub async fn search_flights(&self, request: &FlightSearchRequest) -> Result<String, ClientError> {
        self.submit("search_flights", request).await
    }

    pub async fn search_hotels(&self, request: &HotelSearchRequest) -> Result<String, ClientError> {
        self.submit("search_hotels", request).await
    }

    pub async fn search_restaurants(
        &self,
        request: &RestaurantSearchRequest,
    ) -> Result<String, ClientError> {
        self.submit("search_restaurants", request).await
    }

    pub async fn search_videos(&self, request: &VideoSearchRequest) -> Result<String, ClientError> {
        self.submit("search_youtube", request).await
    }

    /// Current state of a task.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskState, ClientError> {
        let url = format!("{}/task_status/{}", self.base_url, task_id);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<TaskState>().await?),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(task_id.to_string())),
            status => Err(rejected(status, response).await),
        }
    }

    /// Drops a task record on the server.
    pub async fn forget(&self, task_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/task_status/{}", self.base_url, task_id);
        let response = self.client.delete(&url).send().await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(task_id.to_string())),
            status => Err(rejected(status, response).await),
        }
    }

    async fn submit<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<String, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(rejected(status, response).await);
        }

        let accepted: Accepted = response.json().await?;
        debug!(endpoint, task_id = %accepted.task_id, "Search accepted");
        Ok(accepted.task_id)
    }
}

/// Builds a rejection, preferring the server's `{"error": ...}` message.
async fn rejected(status: StatusCode, response: reqwest::Response) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => body,
    };
    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = TravelApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = TravelApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client.task_status("abc").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
