use std::collections::BTreeMap;

use crate::view_model::AppViewModel;

/// The three job completion kinds that need a user decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailJobKind {
    SurveyEmail,
    ManualEmail,
    BulkNotification,
}

impl EmailJobKind {
    /// REST resource the confirm call for this kind is issued against.
    pub fn confirm_resource(self) -> &'static str {
        match self {
            EmailJobKind::SurveyEmail => "surveys/send-email",
            EmailJobKind::ManualEmail => "emails/send-manual-email",
            EmailJobKind::BulkNotification => "notifications/send",
        }
    }

    /// The word used for the recipients of this kind in user-facing copy.
    pub(crate) fn noun(self) -> &'static str {
        match self {
            EmailJobKind::SurveyEmail | EmailJobKind::ManualEmail => "email",
            EmailJobKind::BulkNotification => "notification",
        }
    }
}

/// Stable identity of a displayed notification.
///
/// Email/notification jobs key on their history entry; all export
/// notifications share one reserved key so a newer export supersedes the
/// previous one instead of stacking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationKey {
    Email { email_history_id: String },
    ExportRetry,
}

/// One outstanding, user-actionable decision. All entries are persistent:
/// they disappear only on a successful confirm/undo, on supersession, or
/// when a retry re-enters the download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingNotification {
    EmailJob {
        kind: EmailJobKind,
        template_id: String,
        email_history_id: String,
        users_length: u64,
    },
    ExportRetry { export_history_id: String },
}

impl PendingNotification {
    pub fn key(&self) -> NotificationKey {
        match self {
            PendingNotification::EmailJob {
                email_history_id, ..
            } => NotificationKey::Email {
                email_history_id: email_history_id.clone(),
            },
            PendingNotification::ExportRetry { .. } => NotificationKey::ExportRetry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    notifications: BTreeMap<NotificationKey, PendingNotification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_notifications(self.notifications.values())
    }

    pub fn notification(&self, key: &NotificationKey) -> Option<&PendingNotification> {
        self.notifications.get(key)
    }

    /// Insert an entry under its key, replacing any prior entry there.
    /// Returns the superseded entry, if any.
    pub(crate) fn upsert(&mut self, entry: PendingNotification) -> Option<PendingNotification> {
        self.dirty = true;
        self.notifications.insert(entry.key(), entry)
    }

    /// Remove the entry under `key`, if present.
    pub(crate) fn dismiss(&mut self, key: &NotificationKey) -> Option<PendingNotification> {
        let removed = self.notifications.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
