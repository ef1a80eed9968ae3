use crate::NotificationKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Commit the pending job behind a notification via the gateway.
    ConfirmJob {
        key: NotificationKey,
        resource: &'static str,
        template_id: String,
        history_id: String,
    },
    /// Roll the pending job back via the gateway.
    DiscardJob {
        key: NotificationKey,
        history_id: String,
    },
    /// Open the finished export in a new browsing context.
    OpenDownload { export_history_id: String },
    /// Tell the user the download window was blocked.
    AlertPopupBlocked,
    /// Ask the owning screen to reload its list after a confirmed job.
    RefreshRequested,
}
