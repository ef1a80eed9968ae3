use std::sync::Once;

use notifier_core::{update, AppState, Effect, Msg, NotificationKey};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(notifier_logging::initialize_for_tests);
}

fn export_completed(id: &str) -> Msg {
    Msg::ExportCompleted {
        export_history_id: id.to_string(),
    }
}

fn download_blocked(id: &str) -> Msg {
    Msg::DownloadAttempted {
        export_history_id: id.to_string(),
        opened: false,
    }
}

#[test]
fn export_completion_opens_the_download() {
    init_logging();
    let state = AppState::new();

    let (state, effects) = update(state, export_completed("EXP1"));

    assert_eq!(
        effects,
        vec![Effect::OpenDownload {
            export_history_id: "EXP1".to_string()
        }]
    );
    // Nothing is shown unless the open attempt fails.
    assert!(state.view().notifications.is_empty());
}

#[test]
fn opened_download_is_terminal() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, export_completed("EXP1"));

    let (state, effects) = update(
        state,
        Msg::DownloadAttempted {
            export_history_id: "EXP1".to_string(),
            opened: true,
        },
    );

    assert!(effects.is_empty());
    assert!(state.view().notifications.is_empty());
}

#[test]
fn blocked_download_raises_alert_and_retry_card() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, export_completed("EXP1"));

    let (state, effects) = update(state, download_blocked("EXP1"));

    assert_eq!(effects, vec![Effect::AlertPopupBlocked]);
    assert_eq!(
        state.view().notifications[0].key,
        NotificationKey::ExportRetry
    );
}

#[test]
fn retry_reopens_the_same_export() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, export_completed("EXP1"));
    let (state, _) = update(state, download_blocked("EXP1"));

    let (state, effects) = update(state, Msg::RetryDownloadClicked);

    assert_eq!(
        effects,
        vec![Effect::OpenDownload {
            export_history_id: "EXP1".to_string()
        }]
    );
    // The retry card is gone until the new attempt reports back.
    assert!(state.view().notifications.is_empty());
}

#[test]
fn retry_cycle_can_repeat() {
    init_logging();
    let mut state = AppState::new();
    let (next, _) = update(state, export_completed("EXP1"));
    state = next;

    for _ in 0..3 {
        let (next, effects) = update(state, download_blocked("EXP1"));
        assert_eq!(effects, vec![Effect::AlertPopupBlocked]);
        let (next, effects) = update(next, Msg::RetryDownloadClicked);
        assert_eq!(
            effects,
            vec![Effect::OpenDownload {
                export_history_id: "EXP1".to_string()
            }]
        );
        state = next;
    }
}

#[test]
fn retry_without_card_does_nothing() {
    init_logging();
    let state = AppState::new();

    let (_state, effects) = update(state, Msg::RetryDownloadClicked);

    assert!(effects.is_empty());
}

#[test]
fn newer_export_supersedes_pending_retry() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, export_completed("EXP1"));
    let (state, _) = update(state, download_blocked("EXP1"));

    let (state, effects) = update(state, export_completed("EXP2"));

    assert_eq!(
        effects,
        vec![Effect::OpenDownload {
            export_history_id: "EXP2".to_string()
        }]
    );
    // At most one export notification exists at any time.
    assert!(state.view().notifications.is_empty());

    let (state, _) = update(state, download_blocked("EXP2"));
    assert_eq!(state.view().notifications.len(), 1);

    // The surviving retry is bound to the newer export.
    let (_state, effects) = update(state, Msg::RetryDownloadClicked);
    assert_eq!(
        effects,
        vec![Effect::OpenDownload {
            export_history_id: "EXP2".to_string()
        }]
    );
}

#[test]
fn two_exports_in_succession_show_one_notification() {
    init_logging();
    let state = AppState::new();

    let (state, _) = update(state, export_completed("EXP1"));
    let (state, _) = update(state, download_blocked("EXP1"));
    let (state, _) = update(state, export_completed("EXP2"));
    let (state, _) = update(state, download_blocked("EXP2"));

    assert_eq!(state.view().notifications.len(), 1);
}
