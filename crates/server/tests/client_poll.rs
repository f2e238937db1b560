//! The HTTP client and poller against a live server bound to a local port.

mod common;

use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use tripscout_core::{
    ClientError, FlightSearchRequest, HotelSearchRequest, PollOptions, TravelApiClient,
};

use common::{fixtures, TestFixture};

/// Serves the fixture's router and returns a client pointed at it.
async fn spawn_server(fixture: &TestFixture) -> TravelApiClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let app = fixture.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TravelApiClient::new(format!("http://{}/", addr)).unwrap()
}

fn flight_request() -> FlightSearchRequest {
    FlightSearchRequest {
        origin: "Hanoi".to_string(),
        destination: "Paris".to_string(),
        start_date: "2025-05-01".to_string(),
        end_date: "2025-05-10".to_string(),
        ..Default::default()
    }
}

fn fast() -> PollOptions {
    PollOptions::default().with_interval(Duration::from_millis(20))
}

#[tokio::test]
async fn test_poll_returns_result_document() {
    let fixture = TestFixture::new().await;
    fixture
        .mocks
        .extractor
        .push_result(fixtures::flight_result())
        .await;
    let client = spawn_server(&fixture).await;

    let task_id = client.search_flights(&flight_request()).await.unwrap();
    let data = client
        .poll(&task_id, &fast(), std::future::pending())
        .await
        .unwrap();

    assert_eq!(data["outbound_flight"]["airline"], "Vietnam Airlines");
    assert_eq!(data["return_flight"]["destination"], "HAN");
}

#[tokio::test]
async fn test_poll_surfaces_task_failure() {
    let fixture = TestFixture::new().await;
    fixture.mocks.extractor.push_error("unreadable page").await;
    let client = spawn_server(&fixture).await;

    let task_id = client.search_flights(&flight_request()).await.unwrap();
    let err = client
        .poll(&task_id, &fast(), std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TaskFailed(_)));
}

#[tokio::test]
async fn test_poll_times_out() {
    let fixture = TestFixture::new().await;
    fixture
        .mocks
        .extractor
        .set_delay(Duration::from_secs(5))
        .await;
    let client = spawn_server(&fixture).await;

    let task_id = client.search_flights(&flight_request()).await.unwrap();
    let options = fast().with_timeout(Duration::from_millis(150));
    let err = client
        .poll(&task_id, &options, std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout(t) if t == Duration::from_millis(150)));
}

#[tokio::test]
async fn test_poll_can_be_cancelled() {
    let fixture = TestFixture::new().await;
    fixture
        .mocks
        .extractor
        .set_delay(Duration::from_secs(5))
        .await;
    let client = spawn_server(&fixture).await;

    let task_id = client.search_flights(&flight_request()).await.unwrap();
    let cancel = tokio::time::sleep(Duration::from_millis(100));
    let err = client.poll(&task_id, &fast(), cancel).await.unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let fixture = TestFixture::new().await;
    let client = spawn_server(&fixture).await;

    let err = client
        .poll("missing", &fast(), std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(id) if id == "missing"));
}

#[tokio::test]
async fn test_validation_error_is_rejected() {
    let fixture = TestFixture::new().await;
    let client = spawn_server(&fixture).await;

    let request = HotelSearchRequest {
        location: "Ho Chi Minh City".to_string(),
        check_in: "2025-06-01".to_string(),
        ..Default::default()
    };
    let err = client.search_hotels(&request).await.unwrap_err();

    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(
                message,
                "Missing required parameters. Please provide location, check_in and check_out"
            );
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forget_through_client() {
    let fixture = TestFixture::new().await;
    fixture
        .mocks
        .extractor
        .push_result(json!({"hotels": [{"name": "Riverside Hotel"}]}))
        .await;
    let client = spawn_server(&fixture).await;

    let request = HotelSearchRequest {
        location: "Hue".to_string(),
        check_in: "2025-06-01".to_string(),
        check_out: "2025-06-03".to_string(),
        ..Default::default()
    };
    let task_id = client.search_hotels(&request).await.unwrap();
    client
        .poll(&task_id, &fast(), std::future::pending())
        .await
        .unwrap();

    client.forget(&task_id).await.unwrap();
    let err = client.task_status(&task_id).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}
