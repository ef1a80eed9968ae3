mod config;
mod effects;
mod logging;

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use chrono::Local;
use notifier_core::{update, AppState, AppViewModel, CardAction, Msg, NotificationKey};
use notifier_logging::{notify_info, notify_warn};

use crate::effects::EffectRunner;

/// Input feeding the message loop: core messages (from the engine pump or
/// console commands) plus the console-only requests.
pub enum AppInput {
    Core(Msg),
    ListRequested,
    Quit,
}

fn main() {
    let settings = config::load_settings(std::env::args().nth(1).map(PathBuf::from));
    logging::initialize(settings.log_destination);
    notify_info!("notifier starting against {}", settings.server_base_url);

    let (input_tx, input_rx) = mpsc::channel::<AppInput>();

    let mut runner = EffectRunner::new(settings.engine_config(), input_tx.clone());
    runner.set_refresh_hook(Box::new(|| {
        notify_info!("refresh requested: the owning screen reloads its list here");
    }));

    spawn_console_reader(input_tx);
    print_help();

    let mut state = AppState::new();
    while let Ok(input) = input_rx.recv() {
        match input {
            AppInput::Core(msg) => {
                let (next, effects) = update(state, msg);
                state = next;
                runner.run(effects);
                if state.consume_dirty() {
                    render(&state.view());
                }
            }
            AppInput::ListRequested => render(&state.view()),
            AppInput::Quit => break,
        }
    }

    runner.shutdown();
    notify_info!("notifier shutting down");
}

/// Console commands stand in for the notification card buttons while the
/// real front end is out of scope.
fn spawn_console_reader(input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                // EOF: keep running on push input alone (daemon-style run).
                Ok(0) => break,
                Ok(_) => {
                    if let Some(input) = parse_command(line.trim()) {
                        if input_tx.send(input).is_err() {
                            break;
                        }
                    }
                }
                Err(err) => {
                    notify_warn!("console input error: {}", err);
                    break;
                }
            }
        }
    });
}

fn parse_command(line: &str) -> Option<AppInput> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "list" => Some(AppInput::ListRequested),
        "retry" => Some(AppInput::Core(Msg::RetryDownloadClicked)),
        "confirm" => parts.next().map(|id| {
            AppInput::Core(Msg::ConfirmClicked {
                key: email_key(id),
            })
        }),
        "undo" => parts.next().map(|id| {
            AppInput::Core(Msg::UndoClicked {
                key: email_key(id),
            })
        }),
        "quit" | "exit" => Some(AppInput::Quit),
        other => {
            notify_warn!("unknown command `{}`", other);
            None
        }
    }
}

fn email_key(id: &str) -> NotificationKey {
    NotificationKey::Email {
        email_history_id: id.to_string(),
    }
}

fn render(view: &AppViewModel) {
    println!(
        "--- pending notifications at {} ---",
        Local::now().format("%H:%M:%S")
    );
    if view.notifications.is_empty() {
        println!("(none)");
    }
    for card in &view.notifications {
        let actions: Vec<&str> = card.actions.iter().map(action_label).collect();
        println!(
            "[{}] {}: {} ({})",
            key_label(&card.key),
            card.title,
            card.body,
            actions.join("/")
        );
    }
}

fn key_label(key: &NotificationKey) -> String {
    match key {
        NotificationKey::Email { email_history_id } => email_history_id.clone(),
        NotificationKey::ExportRetry => "export".to_string(),
    }
}

fn action_label(action: &CardAction) -> &'static str {
    match action {
        CardAction::Confirm => "confirm",
        CardAction::Undo => "undo",
        CardAction::RetryDownload => "retry",
    }
}

fn print_help() {
    println!("commands: list | confirm <history-id> | undo <history-id> | retry | quit");
}
