use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use ridetag::api::RideRecordClient;
use ridetag::core::messages::MessageTemplates;
use ridetag::core::{Action, Scanner, Step, update};
use ridetag::nfc::{ReaderCall, SimulatedReader};
use ridetag::runtime::Runtime;
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

const RETURN_DELAY: Duration = Duration::from_millis(50);

/// A running scanner wired to a simulated reader and a real HTTP client
struct Harness {
    reader: Arc<SimulatedReader>,
    runtime: Runtime,
    rx: mpsc::Receiver<Action>,
    scanner: Scanner,
}

impl Harness {
    fn new(reader: SimulatedReader, endpoint: String) -> Self {
        let reader = Arc::new(reader);
        let recorder = RideRecordClient::new(
            endpoint,
            Uuid::parse_str("4ac74819-d310-4f74-860b-70dff5063527").unwrap(),
            Duration::from_secs(2),
        )
        .unwrap();
        let (tx, rx) = mpsc::channel();
        let runtime = Runtime::new(reader.clone(), Arc::new(recorder), tx);
        Self {
            reader,
            runtime,
            rx,
            scanner: Scanner::new(RETURN_DELAY, MessageTemplates::default()),
        }
    }

    fn press(&mut self, action: Action) {
        let effect = update(&mut self.scanner, action);
        self.runtime.execute(effect);
    }

    /// Drain actions until `done` holds; panics after two seconds.
    async fn wait_for<F: Fn(&Scanner) -> bool>(&mut self, what: &str, done: F) {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            self.runtime.drain(&mut self.scanner, &self.rx);
            if done(&self.scanner) {
                return;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {what}; scanner at {}",
                self.scanner.step
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn wait_for_step(&mut self, step: Step) {
        self.wait_for(step.label(), |s| s.step == step).await;
    }
}

async fn endpoint_answering(status: u16) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ride_record/"))
        .respond_with(ResponseTemplate::new(status).set_body_string(r#"{"id": 7}"#))
        .mount(&mock_server)
        .await;
    mock_server
}

fn ride_endpoint(server: &MockServer) -> String {
    format!("{}/api/ride_record/", server.uri())
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_scan_send_and_return_to_waiting() {
    let server = endpoint_answering(201).await;
    let mut h = Harness::new(SimulatedReader::new(true, true), ride_endpoint(&server));

    h.press(Action::Initialize);
    h.wait_for_step(Step::WaitingForTag).await;

    h.reader.tap_uid(&[0xde, 0xad, 0xbe, 0xef]);
    h.wait_for_step(Step::TagRead).await;
    assert_eq!(h.scanner.tag_id, "deadbeef");
    assert_eq!(h.scanner.send_status, "Not sent yet");

    h.press(Action::Send);
    h.wait_for("send outcome", |s| s.send_status.starts_with("Sent:"))
        .await;
    assert!(h.scanner.send_status.starts_with("Sent: deadbeef (HTTP 201)"));
    assert_eq!(h.scanner.step, Step::TagRead);

    // The return timer re-initializes and resets the status
    h.wait_for("return to scanning", |s| {
        s.step == Step::WaitingForTag && s.send_status == "Not sent yet"
    })
    .await;
    assert_eq!(h.reader.listener_count(), 1);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_rejected_send_reports_failure_and_still_returns() {
    let server = endpoint_answering(400).await;
    let mut h = Harness::new(SimulatedReader::new(true, true), ride_endpoint(&server));

    h.press(Action::Initialize);
    h.wait_for_step(Step::WaitingForTag).await;
    h.reader.tap_uid(&[0x04, 0xa3, 0x2b]);
    h.wait_for_step(Step::TagRead).await;

    h.press(Action::Send);
    h.wait_for("send outcome", |s| s.send_status.starts_with("Send failed:"))
        .await;
    assert!(h.scanner.send_status.contains("04a32b"));
    assert!(h.scanner.send_status.contains("HTTP 400"));

    h.wait_for_step(Step::WaitingForTag).await;
}

#[tokio::test]
async fn test_missing_reader_ends_in_no_nfc() {
    let mut h = Harness::new(
        SimulatedReader::new(false, false),
        "http://127.0.0.1:9/unused".to_string(),
    );

    h.press(Action::Initialize);
    h.wait_for_step(Step::NoNfc).await;

    assert_eq!(h.reader.listener_count(), 0);
    assert!(
        !h.reader
            .journal()
            .iter()
            .any(|c| matches!(c, ReaderCall::Register(_)))
    );
}

#[tokio::test]
async fn test_disabled_radio_goes_through_settings() {
    let mut h = Harness::new(
        SimulatedReader::new(true, false),
        "http://127.0.0.1:9/unused".to_string(),
    );

    h.press(Action::Initialize);
    h.wait_for_step(Step::NfcNotEnabled).await;

    h.press(Action::GoToSettings);
    h.wait_for_step(Step::WaitingForNfcEnabled).await;
    assert!(h.reader.is_enabled());

    h.press(Action::ConfirmSettings);
    h.wait_for_step(Step::WaitingForTag).await;
    assert_eq!(h.reader.listener_count(), 1);
}

#[tokio::test]
async fn test_settings_failure_raises_alert() {
    let mut h = Harness::new(
        SimulatedReader::new(true, false).with_settings_available(false),
        "http://127.0.0.1:9/unused".to_string(),
    );

    h.press(Action::Initialize);
    h.wait_for_step(Step::NfcNotEnabled).await;

    h.press(Action::GoToSettings);
    h.wait_for("alert", |s| s.alert.is_some()).await;
    assert_eq!(h.scanner.step, Step::NfcNotEnabled);

    h.press(Action::DismissAlert);
    assert!(h.scanner.alert.is_none());
}

#[tokio::test]
async fn test_stop_during_pending_return_stays_cancelled() {
    let server = endpoint_answering(201).await;
    let mut h = Harness::new(SimulatedReader::new(true, true), ride_endpoint(&server));

    h.press(Action::Initialize);
    h.wait_for_step(Step::WaitingForTag).await;
    h.reader.tap_uid(&[0x01, 0x02]);
    h.wait_for_step(Step::TagRead).await;

    h.press(Action::Send);
    h.wait_for("send outcome", |s| s.pending_return.is_some())
        .await;
    h.press(Action::Stop);
    assert_eq!(h.scanner.step, Step::Cancelled);

    // Outlive the return delay; the cancelled timer must not re-initialize
    tokio::time::sleep(RETURN_DELAY * 4).await;
    h.runtime.drain(&mut h.scanner, &h.rx);
    assert_eq!(h.scanner.step, Step::Cancelled);
    assert_eq!(h.reader.listener_count(), 0);
}

#[tokio::test]
async fn test_resume_scanning_from_tag_read() {
    let mut h = Harness::new(
        SimulatedReader::new(true, true),
        "http://127.0.0.1:9/unused".to_string(),
    );

    h.press(Action::Initialize);
    h.wait_for_step(Step::WaitingForTag).await;
    h.reader.tap_uid(&[0xaa]);
    h.wait_for_step(Step::TagRead).await;

    h.press(Action::ResumeScanning);
    h.wait_for_step(Step::WaitingForTag).await;
    assert_eq!(h.reader.listener_count(), 1);

    h.reader.tap_uid(&[0xbb]);
    h.wait_for_step(Step::TagRead).await;
    assert_eq!(h.scanner.tag_id, "bb");
}
