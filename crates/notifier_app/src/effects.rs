use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use notifier_core::{Effect, EmailJobKind, Msg, NotificationKey, POPUP_BLOCKED_ALERT};
use notifier_engine::{EmailJobPayload, EngineConfig, EngineEvent, EngineHandle, PushMessage};
use notifier_logging::notify_info;

use crate::AppInput;

/// Executes core effects against the engine and pumps engine events back
/// into the app's input channel as core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    refresh_hook: Option<Box<dyn Fn() + Send>>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, input_tx: mpsc::Sender<AppInput>) -> Self {
        let engine = EngineHandle::new(config);
        let runner = Self {
            engine,
            refresh_hook: None,
        };
        runner.spawn_event_loop(input_tx);
        runner.engine.connect();
        runner
    }

    /// Callback run after every successfully confirmed job; the owning
    /// screen uses it to reload whatever list it shows.
    pub fn set_refresh_hook(&mut self, hook: Box<dyn Fn() + Send>) {
        self.refresh_hook = Some(hook);
    }

    /// Release the push stream before the process goes away.
    pub fn shutdown(&self) {
        self.engine.disconnect();
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ConfirmJob {
                    resource,
                    template_id,
                    history_id,
                    ..
                } => {
                    notify_info!("confirming job {}/{}/{}", resource, template_id, history_id);
                    self.engine.confirm(resource, template_id, history_id);
                }
                Effect::DiscardJob { history_id, .. } => {
                    notify_info!("discarding job history {}", history_id);
                    self.engine.discard(history_id);
                }
                Effect::OpenDownload { export_history_id } => {
                    self.engine.open_download(export_history_id);
                }
                Effect::AlertPopupBlocked => {
                    // The console stands in for the blocking browser alert.
                    println!("\n!! {POPUP_BLOCKED_ALERT}");
                }
                Effect::RefreshRequested => {
                    if let Some(hook) = &self.refresh_hook {
                        hook();
                    }
                }
            }
        }
    }

    fn spawn_event_loop(&self, input_tx: mpsc::Sender<AppInput>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if input_tx.send(AppInput::Core(map_event(event))).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Push(message) => map_push(message),
        EngineEvent::ConfirmFinished {
            email_history_id,
            result,
        } => Msg::ConfirmSettled {
            key: NotificationKey::Email { email_history_id },
            success: result.is_ok(),
        },
        EngineEvent::DiscardFinished {
            email_history_id,
            result,
        } => Msg::UndoSettled {
            key: NotificationKey::Email { email_history_id },
            success: result.is_ok(),
        },
        EngineEvent::DownloadAttempted {
            export_history_id,
            opened,
        } => Msg::DownloadAttempted {
            export_history_id,
            opened,
        },
    }
}

fn map_push(message: PushMessage) -> Msg {
    match message {
        PushMessage::SurveyEmailComplete(payload) => email_msg(EmailJobKind::SurveyEmail, payload),
        PushMessage::ManualEmailComplete(payload) => email_msg(EmailJobKind::ManualEmail, payload),
        PushMessage::BulkNotificationComplete(payload) => {
            email_msg(EmailJobKind::BulkNotification, payload)
        }
        PushMessage::ExportComplete { export_history_id } => {
            Msg::ExportCompleted { export_history_id }
        }
        PushMessage::Heartbeat => Msg::HeartbeatReceived,
    }
}

fn email_msg(kind: EmailJobKind, payload: EmailJobPayload) -> Msg {
    Msg::EmailJobCompleted {
        kind,
        template_id: payload.template_id,
        email_history_id: payload.email_history_id,
        users_length: payload.users_length,
    }
}
