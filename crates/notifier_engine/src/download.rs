use std::process::Command;

use notifier_logging::notify_warn;

/// Deterministic download location for a finished export.
pub fn download_url(server_base_url: &str, export_history_id: &str) -> String {
    format!(
        "{}/report_classes/send_download_report/{}",
        server_base_url.trim_end_matches('/'),
        export_history_id
    )
}

/// Seam for opening a download in a new browsing context. The production
/// implementation launches the system browser; tests substitute a stub
/// that reports blocked windows.
pub trait DownloadOpener: Send + Sync {
    /// Returns true when a usable browsing context was obtained.
    fn open(&self, url: &str) -> bool;
}

/// Opens the platform browser in a detached process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowserOpener;

impl DownloadOpener for SystemBrowserOpener {
    fn open(&self, url: &str) -> bool {
        match spawn_browser(url) {
            Ok(()) => true,
            Err(err) => {
                notify_warn!("failed to open browser for {}: {}", url, err);
                false
            }
        }
    }
}

#[cfg(target_os = "windows")]
fn spawn_browser(url: &str) -> std::io::Result<()> {
    Command::new("cmd").args(["/C", "start", "", url]).spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn spawn_browser(url: &str) -> std::io::Result<()> {
    Command::new("open").arg(url).spawn()?;
    Ok(())
}

#[cfg(all(unix, not(target_os = "macos")))]
fn spawn_browser(url: &str) -> std::io::Result<()> {
    Command::new("xdg-open").arg(url).spawn()?;
    Ok(())
}
