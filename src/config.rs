use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::install::release::ReleaseChannel;

/// User configuration, read once at activation and immutable afterwards.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Explicit server binary path (absolute or `~`-relative). A non-empty
    /// value bypasses all release, cache, and download logic.
    pub server_path: Option<String>,
    /// Release channel to install from; defaults to `latest`.
    pub release_channel: ReleaseChannel,
}

impl Config {
    /// Loads configuration from the default config file, falling back to
    /// defaults if the file is missing.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!("ignoring malformed config at {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// The configured server path, trimmed; `None` when unset or blank.
    pub fn configured_server_path(&self) -> Option<&str> {
        self.server_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

/// Returns the persistent storage root for asn1-lsp-client.
/// Uses $XDG_DATA_HOME/asn1-lsp-client if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/asn1-lsp-client,
/// or ./asn1-lsp-client if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Log file name inside the data directory.
pub const LOG_FILE_NAME: &str = "asn1-lsp-client.log";

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("asn1-lsp-client")
}
