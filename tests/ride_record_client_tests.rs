use std::time::Duration;

use ridetag::api::{ApiError, RideRecordClient, RideRecorder};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

const DEVICE: &str = "4ac74819-d310-4f74-860b-70dff5063527";

fn device_id() -> Uuid {
    Uuid::parse_str(DEVICE).unwrap()
}

/// Creates a client pointed at `/api/ride_record/` on the mock server
fn client_for(server: &MockServer, timeout: Duration) -> RideRecordClient {
    RideRecordClient::new(
        format!("{}/api/ride_record/", server.uri()),
        device_id(),
        timeout,
    )
    .unwrap()
}

// ============================================================================
// Status Handling
// ============================================================================

#[tokio::test]
async fn test_created_response_is_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ride_record/"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id": 42}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(5));
    let receipt = assert_ok!(client.record("deadbeef").await);

    assert_eq!(receipt.status, 201);
    assert!(receipt.is_created());
    assert_eq!(receipt.record_id().as_deref(), Some("42"));
}

#[tokio::test]
async fn test_ok_200_is_not_created() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ride_record/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(5));
    let receipt = assert_ok!(client.record("deadbeef").await);

    // Only 201 counts; a 200 is still a completed request but not a success
    assert_eq!(receipt.status, 200);
    assert!(!receipt.is_created());
}

#[tokio::test]
async fn test_server_error_returns_receipt_not_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ride_record/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(5));
    let receipt = assert_ok!(client.record("deadbeef").await);

    assert_eq!(receipt.status, 500);
    assert!(!receipt.is_created());
    assert_eq!(receipt.record_id(), None);
}

// ============================================================================
// Request Shape
// ============================================================================

#[tokio::test]
async fn test_request_is_form_encoded_with_member_and_device() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ride_record/"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(format!("member_id=04a32b&device={DEVICE}")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(5));
    let receipt = assert_ok!(client.record("04a32b").await);

    // A mismatch on any matcher would make wiremock answer 404
    assert_eq!(receipt.status, 201);
}

// ============================================================================
// Transport Failures
// ============================================================================

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let mock_server = MockServer::start().await;
    let endpoint = format!("{}/api/ride_record/", mock_server.uri());
    drop(mock_server);

    let client = RideRecordClient::new(endpoint, device_id(), Duration::from_secs(5)).unwrap();
    let err = assert_err!(client.record("deadbeef").await);

    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().starts_with("network error:"));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ride_record/"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_millis(200));
    let err = assert_err!(client.record("deadbeef").await);

    assert!(matches!(err, ApiError::Network(_)));
}
