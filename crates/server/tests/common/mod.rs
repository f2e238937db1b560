//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock browser, extractor, LLM and transcript source injected, so the
//! whole request-to-result flow runs without a browser or network.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tripscout_core::{
    load_config_from_str, testing::MockCapabilities, Config, InMemoryTaskStore, Pipelines,
    TaskStore, WorkerPool,
};
use tripscout_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use tripscout_core::testing::fixtures;

const BASE_CONFIG: &str = r#"
[llm]
provider = "ollama"
model = "llama3"

[server]
host = "127.0.0.1"
port = 5000
"#;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_flight_search() {
///     let fixture = TestFixture::new().await;
///     fixture.mocks.extractor.push_result(fixtures::flight_result()).await;
///
///     let response = fixture.post("/search_flights", json!({ ... })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock collaborators shared with the pipelines
    pub mocks: MockCapabilities,
    /// The store behind the router, for direct assertions
    pub store: Arc<InMemoryTaskStore>,
    pub pool: Arc<WorkerPool>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Body as text, for non-JSON responses
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let mut config: Config =
            load_config_from_str(BASE_CONFIG).expect("Failed to parse test config");
        config.workers.max_concurrent = test_config.max_concurrent;
        config.workers.queue_capacity = test_config.queue_capacity;

        let mocks = MockCapabilities::new();
        let store = Arc::new(InMemoryTaskStore::new(config.task_store.clone()));
        let pool = Arc::new(WorkerPool::new(
            config.workers.clone(),
            Arc::clone(&store) as Arc<dyn TaskStore>,
        ));
        let pipelines = Pipelines::new(mocks.deps());

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn TaskStore>,
            Arc::clone(&pool),
            pipelines,
        ));

        Self {
            router: create_router(state),
            mocks,
            store,
            pool,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Polls a task until it reaches a terminal state.
    pub async fn wait_for_terminal(&self, task_id: &str) -> TestResponse {
        let path = format!("/task_status/{}", task_id);
        for _ in 0..200 {
            let response = self.get(&path).await;
            let status = response.body["status"].as_str().unwrap_or_default();
            if status == "completed" || status == "failed" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Task {} did not finish in time", task_id);
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub max_concurrent: usize,
    pub queue_capacity: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            queue_capacity: 16,
        }
    }
}

impl TestConfig {
    /// A pool that holds exactly one task at a time.
    pub fn single_slot() -> Self {
        Self {
            max_concurrent: 1,
            queue_capacity: 0,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text
        );
    };
}
