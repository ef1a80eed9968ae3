use std::fs;
use std::path::PathBuf;

use notifier_engine::EngineConfig;
use notifier_logging::{notify_info, notify_warn};
use serde::{Deserialize, Serialize};

const SETTINGS_FILENAME: &str = "notifier.ron";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogDestination {
    /// Write to ./notifier.log in the current directory.
    File,
    /// Write to the terminal (stdout).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the admin platform. The push and API endpoints derive
    /// from it unless overridden below.
    pub server_base_url: String,
    pub push_endpoint_url: Option<String>,
    pub api_base_url: Option<String>,
    pub auth_token: Option<String>,
    pub log_destination: LogDestination,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            server_base_url: "http://localhost:8000".to_string(),
            push_endpoint_url: None,
            api_base_url: None,
            auth_token: None,
            log_destination: LogDestination::Terminal,
        }
    }
}

impl AppSettings {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::for_server(self.server_base_url.clone());
        if let Some(url) = &self.push_endpoint_url {
            config.push_endpoint_url = url.clone();
        }
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.clone();
        }
        config.auth_token = self.auth_token.clone();
        config
    }
}

/// Load settings from `path`, or `./notifier.ron` when none is given.
/// A missing file means defaults; an unreadable or unparsable file is
/// logged and falls back to defaults as well.
pub fn load_settings(path: Option<PathBuf>) -> AppSettings {
    let path = path.unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME));
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppSettings::default();
        }
        Err(err) => {
            notify_warn!("failed to read settings from {:?}: {}", path, err);
            return AppSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            notify_info!("loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            notify_warn!("failed to parse settings from {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(Some(dir.path().join("absent.ron")));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(server_base_url: ").expect("write");
        let settings = load_settings(Some(path));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn round_trips_written_settings() {
        let expected = AppSettings {
            server_base_url: "https://admin.example.com".to_string(),
            push_endpoint_url: Some("https://admin.example.com/push".to_string()),
            api_base_url: None,
            auth_token: Some("secret".to_string()),
            log_destination: LogDestination::Both,
        };

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILENAME);
        let pretty = ron::ser::PrettyConfig::new();
        let mut file = fs::File::create(&path).expect("create settings");
        file.write_all(
            ron::ser::to_string_pretty(&expected, pretty)
                .expect("serialize settings")
                .as_bytes(),
        )
        .expect("write settings");

        assert_eq!(load_settings(Some(path)), expected);
    }

    #[test]
    fn engine_config_prefers_overrides() {
        let settings = AppSettings {
            server_base_url: "https://admin.example.com/".to_string(),
            push_endpoint_url: Some("https://push.example.com/stream".to_string()),
            api_base_url: None,
            auth_token: Some("secret".to_string()),
            log_destination: LogDestination::Terminal,
        };

        let config = settings.engine_config();
        assert_eq!(config.push_endpoint_url, "https://push.example.com/stream");
        assert_eq!(config.api_base_url, "https://admin.example.com/api");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }
}
