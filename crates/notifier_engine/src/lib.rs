//! Notifier engine: push-stream intake and effect execution.
mod codec;
mod download;
mod engine;
mod gateway;
mod stream;
mod types;

pub use codec::{decode_push, DecodeError};
pub use download::{download_url, DownloadOpener, SystemBrowserOpener};
pub use engine::{EngineConfig, EngineHandle};
pub use gateway::{GatewayError, GatewaySettings, JobActionGateway, RestGateway, DISCARD_RESOURCE};
pub use stream::{
    ChannelPushSink, PushSink, SseEvent, SseParser, StreamConnection, StreamError, StreamLease,
    StreamSettings, StreamSupervisor, CHANNEL_BULK_NOTIFICATION, CHANNEL_EXPORT,
    CHANNEL_MANUAL_EMAIL, CHANNEL_PROGRESS, CHANNEL_SURVEY_EMAIL, SUBSCRIBED_CHANNELS,
};
pub use types::{EmailJobPayload, EngineEvent, PushMessage};
