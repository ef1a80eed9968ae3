use crate::gateway::GatewayError;

/// Decoded server-push message, discriminated by the wire `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    SurveyEmailComplete(EmailJobPayload),
    ManualEmailComplete(EmailJobPayload),
    BulkNotificationComplete(EmailJobPayload),
    ExportComplete { export_history_id: String },
    /// Keep-alive, progress ping, or any discriminator this client has no
    /// behavior for.
    Heartbeat,
}

/// Payload shared by the three email/notification completion kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJobPayload {
    pub template_id: String,
    pub email_history_id: String,
    pub users_length: u64,
}

/// Events the engine reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A message arrived on the push stream.
    Push(PushMessage),
    /// A confirm call settled.
    ConfirmFinished {
        email_history_id: String,
        result: Result<(), GatewayError>,
    },
    /// A discard call settled.
    DiscardFinished {
        email_history_id: String,
        result: Result<(), GatewayError>,
    },
    /// A download open attempt finished; `opened` is false when the
    /// browsing context could not be obtained (popup blocked).
    DownloadAttempted {
        export_history_id: String,
        opened: bool,
    },
}
