use std::sync::{Arc, Mutex};
use std::time::Duration;

use notifier_engine::{
    EmailJobPayload, EngineEvent, PushMessage, PushSink, StreamConnection, StreamError,
    StreamSettings, StreamSupervisor,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl PushSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

async fn serve_stream(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

fn survey_email_event() -> EngineEvent {
    EngineEvent::Push(PushMessage::SurveyEmailComplete(EmailJobPayload {
        template_id: "T1".to_string(),
        email_history_id: "H1".to_string(),
        users_length: 5,
    }))
}

const SURVEY_EMAIL_JSON: &str =
    r#"{"type":"survey_email","templateId":"T1","emailHistoryId":"H1","usersLength":5}"#;

#[tokio::test]
async fn named_channel_payload_reaches_the_sink() {
    let server = MockServer::start().await;
    let body = format!("event: survey-email-complete\ndata: {SURVEY_EMAIL_JSON}\n\n");
    serve_stream(&server, &body).await;

    let connection = StreamConnection::new(StreamSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/stream", server.uri());
    connection
        .run(&url, &sink, CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(sink.take(), vec![survey_email_event()]);
}

#[tokio::test]
async fn legacy_channel_behaves_like_the_named_one() {
    let server = MockServer::start().await;
    // The same payload once on its named channel, once on the default
    // channel. Both must decode identically; neither is deduplicated.
    let body = format!(
        "event: survey-email-complete\ndata: {SURVEY_EMAIL_JSON}\n\ndata: {SURVEY_EMAIL_JSON}\n\n"
    );
    serve_stream(&server, &body).await;

    let connection = StreamConnection::new(StreamSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/stream", server.uri());
    connection
        .run(&url, &sink, CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(sink.take(), vec![survey_email_event(), survey_email_event()]);
}

#[tokio::test]
async fn legacy_heartbeat_is_forwarded_as_heartbeat() {
    let server = MockServer::start().await;
    serve_stream(&server, "data: {\"type\":\"hearthbeat\"}\n\n").await;

    let connection = StreamConnection::new(StreamSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/stream", server.uri());
    connection
        .run(&url, &sink, CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(
        sink.take(),
        vec![EngineEvent::Push(PushMessage::Heartbeat)]
    );
}

#[tokio::test]
async fn unlisted_channel_is_handled_by_the_catch_all() {
    let server = MockServer::start().await;
    let body = format!("event: some-future-channel\ndata: {SURVEY_EMAIL_JSON}\n\n");
    serve_stream(&server, &body).await;

    let connection = StreamConnection::new(StreamSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/stream", server.uri());
    connection
        .run(&url, &sink, CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(sink.take(), vec![survey_email_event()]);
}

#[tokio::test]
async fn bad_payload_is_dropped_without_ending_the_stream() {
    let server = MockServer::start().await;
    let body = format!(
        "data: {{not json\n\nevent: export-complete\ndata: {}\n\n",
        r#"{"type":"exports","exportHistoryId":"EXP1"}"#
    );
    serve_stream(&server, &body).await;

    let connection = StreamConnection::new(StreamSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/stream", server.uri());
    connection
        .run(&url, &sink, CancellationToken::new())
        .await
        .expect("stream ok");

    assert_eq!(
        sink.take(),
        vec![EngineEvent::Push(PushMessage::ExportComplete {
            export_history_id: "EXP1".to_string()
        })]
    );
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let connection = StreamConnection::new(StreamSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/stream", server.uri());
    let err = connection
        .run(&url, &sink, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Status(401)));
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn supervisor_shares_one_connection_across_leases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_raw(": keep-alive\n", "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let supervisor = StreamSupervisor::new(
        format!("{}/stream", server.uri()),
        StreamSettings::default(),
    );
    let sink = Arc::new(TestSink::new());

    let lease_a = supervisor.acquire(sink.clone());
    let lease_b = supervisor.acquire(sink.clone());
    tokio::time::sleep(Duration::from_millis(500)).await;
    drop(lease_a);
    drop(lease_b);

    server.verify().await;
}

#[tokio::test]
async fn supervisor_reopens_after_the_last_lease_drops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(": hi\n", "text/event-stream"))
        .expect(2)
        .mount(&server)
        .await;

    let supervisor = StreamSupervisor::new(
        format!("{}/stream", server.uri()),
        StreamSettings::default(),
    );
    let sink = Arc::new(TestSink::new());

    let lease = supervisor.acquire(sink.clone());
    tokio::time::sleep(Duration::from_millis(200)).await;
    drop(lease);

    let lease = supervisor.acquire(sink.clone());
    tokio::time::sleep(Duration::from_millis(200)).await;
    drop(lease);

    server.verify().await;
}
