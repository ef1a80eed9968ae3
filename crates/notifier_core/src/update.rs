use crate::{AppState, Effect, Msg, NotificationKey, PendingNotification};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::EmailJobCompleted {
            kind,
            template_id,
            email_history_id,
            users_length,
        } => {
            state.upsert(PendingNotification::EmailJob {
                kind,
                template_id,
                email_history_id,
                users_length,
            });
            Vec::new()
        }
        Msg::ExportCompleted { export_history_id } => {
            // A newer export supersedes any earlier retry card before the
            // download attempt is made.
            state.dismiss(&NotificationKey::ExportRetry);
            vec![Effect::OpenDownload { export_history_id }]
        }
        Msg::DownloadAttempted { opened: true, .. } => Vec::new(),
        Msg::DownloadAttempted {
            export_history_id,
            opened: false,
        } => {
            state.upsert(PendingNotification::ExportRetry { export_history_id });
            vec![Effect::AlertPopupBlocked]
        }
        Msg::RetryDownloadClicked => match state.dismiss(&NotificationKey::ExportRetry) {
            Some(PendingNotification::ExportRetry { export_history_id }) => {
                vec![Effect::OpenDownload { export_history_id }]
            }
            _ => Vec::new(),
        },
        Msg::ConfirmClicked { key } => confirm_effects(&state, key),
        Msg::UndoClicked { key } => undo_effects(&state, key),
        Msg::ConfirmSettled { key, success } => {
            // Only an actual dismissal triggers the refresh, so a settle
            // arriving twice cannot refresh twice.
            if success && state.dismiss(&key).is_some() {
                vec![Effect::RefreshRequested]
            } else {
                Vec::new()
            }
        }
        Msg::UndoSettled { key, success } => {
            if success {
                state.dismiss(&key);
            }
            Vec::new()
        }
        Msg::HeartbeatReceived | Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn confirm_effects(state: &AppState, key: NotificationKey) -> Vec<Effect> {
    match state.notification(&key) {
        Some(PendingNotification::EmailJob {
            kind,
            template_id,
            email_history_id,
            ..
        }) => vec![Effect::ConfirmJob {
            resource: kind.confirm_resource(),
            template_id: template_id.clone(),
            history_id: email_history_id.clone(),
            key,
        }],
        // A click races against supersession or an earlier settle; nothing
        // left to confirm.
        _ => Vec::new(),
    }
}

fn undo_effects(state: &AppState, key: NotificationKey) -> Vec<Effect> {
    match state.notification(&key) {
        Some(PendingNotification::EmailJob {
            email_history_id, ..
        }) => vec![Effect::DiscardJob {
            history_id: email_history_id.clone(),
            key,
        }],
        _ => Vec::new(),
    }
}
