use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use notifier_logging::{notify_error, notify_info, notify_warn};

use crate::download::{download_url, DownloadOpener, SystemBrowserOpener};
use crate::gateway::{GatewaySettings, JobActionGateway, RestGateway};
use crate::stream::{ChannelPushSink, PushSink, StreamLease, StreamSettings, StreamSupervisor};
use crate::EngineEvent;

/// Engine wiring. `for_server` derives the conventional endpoint layout
/// from one base URL; every field can be overridden afterwards.
#[derive(Clone)]
pub struct EngineConfig {
    pub server_base_url: String,
    pub push_endpoint_url: String,
    pub api_base_url: String,
    pub auth_token: Option<String>,
    /// Replaceable so tests can observe download attempts without spawning
    /// a browser.
    pub download_opener: Arc<dyn DownloadOpener>,
}

impl EngineConfig {
    pub fn for_server(server_base_url: impl Into<String>) -> Self {
        let server_base_url = server_base_url.into();
        let base = server_base_url.trim_end_matches('/');
        Self {
            push_endpoint_url: format!("{base}/api/notifications/stream"),
            api_base_url: format!("{base}/api"),
            auth_token: None,
            download_opener: Arc::new(SystemBrowserOpener),
            server_base_url,
        }
    }
}

enum EngineCommand {
    Connect,
    Disconnect,
    Confirm {
        resource: String,
        template_id: String,
        history_id: String,
    },
    Discard {
        history_id: String,
    },
    OpenDownload {
        export_history_id: String,
    },
}

/// Handle on the engine thread. Commands go in over a channel; completions
/// and stream messages come back as [`EngineEvent`]s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_engine(config, cmd_rx, event_tx));

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Open the push stream (or join the one already open).
    pub fn connect(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Connect);
    }

    /// Release this handle's interest in the push stream.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Disconnect);
    }

    pub fn confirm(
        &self,
        resource: impl Into<String>,
        template_id: impl Into<String>,
        history_id: impl Into<String>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Confirm {
            resource: resource.into(),
            template_id: template_id.into(),
            history_id: history_id.into(),
        });
    }

    pub fn discard(&self, history_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Discard {
            history_id: history_id.into(),
        });
    }

    pub fn open_download(&self, export_history_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::OpenDownload {
            export_history_id: export_history_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

fn run_engine(
    config: EngineConfig,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let mut gateway_settings = GatewaySettings::new(config.api_base_url.clone());
    gateway_settings.auth_token = config.auth_token.clone();
    let gateway: Arc<dyn JobActionGateway> = match RestGateway::new(gateway_settings) {
        Ok(gateway) => Arc::new(gateway),
        Err(err) => {
            notify_error!("cannot build job action gateway: {}", err);
            return;
        }
    };

    let stream_settings = StreamSettings {
        auth_token: config.auth_token.clone(),
        ..StreamSettings::default()
    };
    let supervisor = StreamSupervisor::new(config.push_endpoint_url.clone(), stream_settings);
    let sink: Arc<dyn PushSink> = Arc::new(ChannelPushSink::new(event_tx.clone()));
    let mut lease: Option<StreamLease> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Connect => {
                let _guard = runtime.enter();
                lease = Some(supervisor.acquire(sink.clone()));
            }
            EngineCommand::Disconnect => {
                lease.take();
            }
            EngineCommand::Confirm {
                resource,
                template_id,
                history_id,
            } => {
                let gateway = gateway.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = gateway.confirm(&resource, &template_id, &history_id).await;
                    if let Err(err) = &result {
                        notify_warn!("confirm failed for {}/{}: {}", resource, history_id, err);
                    }
                    let _ = event_tx.send(EngineEvent::ConfirmFinished {
                        email_history_id: history_id,
                        result,
                    });
                });
            }
            EngineCommand::Discard { history_id } => {
                let gateway = gateway.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = gateway.discard(&history_id).await;
                    if let Err(err) = &result {
                        notify_warn!("discard failed for {}: {}", history_id, err);
                    }
                    let _ = event_tx.send(EngineEvent::DiscardFinished {
                        email_history_id: history_id,
                        result,
                    });
                });
            }
            EngineCommand::OpenDownload { export_history_id } => {
                let url = download_url(&config.server_base_url, &export_history_id);
                notify_info!("opening export download {}", url);
                let opened = config.download_opener.open(&url);
                let _ = event_tx.send(EngineEvent::DownloadAttempted {
                    export_history_id,
                    opened,
                });
            }
        }
    }

    // Command channel closed: the owner is gone, release the stream.
    drop(lease);
}
