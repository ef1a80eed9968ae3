use crate::{EmailJobKind, NotificationKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Decoded bulk email/notification completion from the push stream.
    EmailJobCompleted {
        kind: EmailJobKind,
        template_id: String,
        email_history_id: String,
        users_length: u64,
    },
    /// Decoded export completion from the push stream.
    ExportCompleted { export_history_id: String },
    /// Keep-alive from the push stream; carries nothing.
    HeartbeatReceived,
    /// User committed the pending job behind a notification.
    ConfirmClicked { key: NotificationKey },
    /// User rolled the pending job back.
    UndoClicked { key: NotificationKey },
    /// Gateway outcome for an earlier confirm.
    ConfirmSettled { key: NotificationKey, success: bool },
    /// Gateway outcome for an earlier undo.
    UndoSettled { key: NotificationKey, success: bool },
    /// Outcome of an attempt to open the export download.
    DownloadAttempted {
        export_history_id: String,
        opened: bool,
    },
    /// User clicked Retry on a blocked export download.
    RetryDownloadClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
