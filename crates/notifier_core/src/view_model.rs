use crate::{EmailJobKind, NotificationKey, PendingNotification};

/// Alert copy surfaced when the browser refuses to open the download.
pub const POPUP_BLOCKED_ALERT: &str =
    "The download window was blocked. Please allow popups for this site, then retry the download.";

/// Body copy of the persistent export retry card.
pub const RETRY_DOWNLOAD_BODY: &str = "Retry last download";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub notifications: Vec<NotificationCardView>,
}

/// Content and wiring of one notification card. Rendering is up to the
/// consumer; the dispatcher only decides what the card says and which
/// actions it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationCardView {
    pub key: NotificationKey,
    pub title: String,
    pub body: String,
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Confirm,
    Undo,
    RetryDownload,
}

impl AppViewModel {
    pub(crate) fn from_notifications<'a>(
        entries: impl Iterator<Item = &'a PendingNotification>,
    ) -> Self {
        Self {
            notifications: entries.map(card_for).collect(),
        }
    }
}

fn card_for(entry: &PendingNotification) -> NotificationCardView {
    match entry {
        PendingNotification::EmailJob {
            kind, users_length, ..
        } => {
            let title = match kind {
                EmailJobKind::SurveyEmail | EmailJobKind::ManualEmail => "Emails Confirmation",
                EmailJobKind::BulkNotification => "Notifications Confirmation",
            };
            NotificationCardView {
                key: entry.key(),
                title: title.to_string(),
                body: format!(
                    "Sending {} to {} {}",
                    kind.noun(),
                    users_length,
                    pluralize_users(*users_length)
                ),
                actions: vec![CardAction::Confirm, CardAction::Undo],
            }
        }
        PendingNotification::ExportRetry { .. } => NotificationCardView {
            key: entry.key(),
            title: "Export Download".to_string(),
            body: RETRY_DOWNLOAD_BODY.to_string(),
            actions: vec![CardAction::RetryDownload],
        },
    }
}

/// Singular exactly at one recipient; zero is plural.
fn pluralize_users(count: u64) -> &'static str {
    if count == 1 {
        "user"
    } else {
        "users"
    }
}
