use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures_util::StreamExt;
use notifier_logging::{notify_debug, notify_error, notify_info, notify_warn};
use tokio_util::sync::CancellationToken;

use crate::codec::decode_push;
use crate::EngineEvent;

/// Named channels of the push protocol.
pub const CHANNEL_SURVEY_EMAIL: &str = "survey-email-complete";
pub const CHANNEL_MANUAL_EMAIL: &str = "manual-email-complete";
pub const CHANNEL_BULK_NOTIFICATION: &str = "bulk-notification-complete";
pub const CHANNEL_EXPORT: &str = "export-complete";
pub const CHANNEL_PROGRESS: &str = "progress-update";

/// Events without an `event:` field arrive under this implicit name; legacy
/// emitters deliver everything this way.
const CHANNEL_DEFAULT: &str = "message";

pub const SUBSCRIBED_CHANNELS: [&str; 5] = [
    CHANNEL_SURVEY_EMAIL,
    CHANNEL_MANUAL_EMAIL,
    CHANNEL_BULK_NOTIFICATION,
    CHANNEL_EXPORT,
    CHANNEL_PROGRESS,
];

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub connect_timeout: Duration,
    /// Bearer token attached to the stream request, when the deployment
    /// requires one.
    pub auth_token: Option<String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            auth_token: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("http status {0} from push endpoint")]
    Status(u16),
    #[error("network error on push stream: {0}")]
    Network(String),
}

/// Receiver seam for everything the stream produces.
pub trait PushSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelPushSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelPushSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl PushSink for ChannelPushSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// One server-sent event as it came off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Channel name from the `event:` field; `None` on the default channel.
    pub name: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` parser. Chunk boundaries may fall
/// anywhere, including inside a multi-byte character, so lines are
/// assembled as bytes before they are decoded.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event_name: Option<String>,
    data_lines: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk from the wire; returns every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&byte| byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.take_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    fn take_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            // Comment line; servers use these as keep-alive padding.
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event_name = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // `id` and `retry` are valid fields this client has no use for.
            _ => {}
        }
        None
    }

    fn flush(&mut self) -> Option<SseEvent> {
        let name = self.event_name.take();
        if self.data_lines.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data_lines).join("\n");
        Some(SseEvent { name, data })
    }
}

/// Owns one streaming request against the push endpoint.
///
/// No reconnect or backoff is attempted: when the stream errors or ends,
/// the loop returns and the owner decides whether to open a new one.
pub struct StreamConnection {
    settings: StreamSettings,
}

impl StreamConnection {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, StreamError> {
        // Connect timeout only: the stream itself stays open indefinitely,
        // so a total request timeout would sever healthy connections.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| StreamError::Client(err.to_string()))
    }

    /// Read the push stream until it ends, errors, or `cancel` fires.
    /// Every decodable payload is emitted through `sink`.
    pub async fn run(
        &self,
        url: &str,
        sink: &dyn PushSink,
        cancel: CancellationToken,
    ) -> Result<(), StreamError> {
        let client = self.build_client()?;
        let mut request = client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = &self.settings.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| StreamError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status.as_u16()));
        }
        notify_info!("push stream connected to {}", url);

        let mut parser = SseParser::new();
        let mut stream = response.bytes_stream();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    notify_info!("push stream closed by owner");
                    return Ok(());
                }
                chunk = stream.next() => match chunk {
                    Some(Ok(chunk)) => {
                        for event in parser.feed(&chunk) {
                            dispatch_event(event, sink);
                        }
                    }
                    Some(Err(err)) => return Err(StreamError::Network(err.to_string())),
                    None => {
                        notify_info!("push stream ended");
                        return Ok(());
                    }
                },
            }
        }
    }
}

/// Route one wire event into the decoder.
///
/// Named channels and the legacy catch-all go through the same decode
/// function, so both delivery paths behave identically by construction.
/// The catch-all also covers channels outside the subscribed set.
fn dispatch_event(event: SseEvent, sink: &dyn PushSink) {
    let channel = event.name.as_deref().unwrap_or(CHANNEL_DEFAULT);
    if channel != CHANNEL_DEFAULT && !SUBSCRIBED_CHANNELS.contains(&channel) {
        notify_debug!("payload on unlisted channel `{}` handled by catch-all", channel);
    }
    match decode_push(&event.data) {
        Ok(message) => sink.emit(EngineEvent::Push(message)),
        Err(err) => {
            // A single bad payload must never take the listener down.
            notify_warn!("dropping undecodable payload on `{}`: {}", channel, err);
        }
    }
}

struct LeaseInner {
    cancel: CancellationToken,
}

impl Drop for LeaseInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Shared handle on the live push connection. The connection closes when
/// the last lease is dropped.
pub struct StreamLease {
    _inner: Arc<LeaseInner>,
}

/// Makes connection ownership explicit: at most one push stream exists per
/// supervisor, no matter how many screens ask for one.
pub struct StreamSupervisor {
    url: String,
    settings: StreamSettings,
    active: Mutex<Weak<LeaseInner>>,
}

impl StreamSupervisor {
    pub fn new(url: impl Into<String>, settings: StreamSettings) -> Self {
        Self {
            url: url.into(),
            settings,
            active: Mutex::new(Weak::new()),
        }
    }

    /// Hand out a lease on the push connection. The first lease opens it,
    /// later leases share it. Must be called from within a tokio runtime.
    pub fn acquire(&self, sink: Arc<dyn PushSink>) -> StreamLease {
        let mut active = self.active.lock().expect("stream supervisor lock");
        if let Some(inner) = active.upgrade() {
            notify_debug!("push stream already open; sharing the existing connection");
            return StreamLease { _inner: inner };
        }

        let cancel = CancellationToken::new();
        let inner = Arc::new(LeaseInner {
            cancel: cancel.clone(),
        });
        *active = Arc::downgrade(&inner);

        let connection = StreamConnection::new(self.settings.clone());
        let url = self.url.clone();
        tokio::spawn(async move {
            if let Err(err) = connection.run(&url, sink.as_ref(), cancel).await {
                notify_error!("push stream closed: {}", err);
            }
        });

        StreamLease { _inner: inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_emits_event_with_name_and_data() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: export-complete\ndata: {\"a\":1}\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                name: Some("export-complete".to_string()),
                data: "{\"a\":1}".to_string(),
            }]
        );
    }

    #[test]
    fn parser_joins_multi_line_data() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: first\ndata: second\n\n");
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[test]
    fn parser_resets_event_name_between_events() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: named\ndata: one\n\ndata: two\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name.as_deref(), Some("named"));
        assert_eq!(events[1].name, None);
    }

    #[test]
    fn parser_ignores_comments_and_handles_crlf() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keep-alive\r\ndata: x\r\n\r\n");
        assert_eq!(events, vec![SseEvent { name: None, data: "x".to_string() }]);
    }

    #[test]
    fn parser_buffers_partial_lines_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: par").is_empty());
        assert!(parser.feed(b"tial\n").is_empty());
        let events = parser.feed(b"\n");
        assert_eq!(events[0].data, "partial");
    }

    #[test]
    fn parser_drops_event_without_data() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"event: progress-update\n\n").is_empty());
    }
}
