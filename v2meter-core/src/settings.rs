//! Immutable runtime settings.
//!
//! # Layering
//!
//! ```text
//! compiled-in defaults
//!   <- settings.yaml   (every field optional)
//!     <- CLI flags     (applied by v2meter-cli)
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)` — explicit file; used in tests with `TempDir`
//! - `load()` — `<config dir>/v2meter/settings.yaml` if present, else defaults
//!
//! Once built, a [`Settings`] value is only ever passed by reference.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::types::{ApiEndpoint, Identity};

pub const SETTINGS_DIR: &str = "v2meter";
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Everything the resolver, transformer, supervisor and poller need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub identity: Identity,
    /// Collector endpoint; `uuid=<identity.uuid>` is appended per request.
    pub report_url: String,
    pub api: ApiEndpoint,
    /// Protocol of the inbound whose first client becomes the tracked identity.
    pub inbound_protocol: String,
    pub original_config: PathBuf,
    pub runtime_config: PathBuf,
    pub poll_interval_secs: u64,
    pub startup_delay_secs: u64,
    pub command_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            report_url: "https://traffic-recorder.aung-245.workers.dev/".to_string(),
            api: ApiEndpoint::default(),
            inbound_protocol: "vless".to_string(),
            original_config: PathBuf::from("/etc/v2ray/config.json"),
            runtime_config: default_runtime_config(),
            poll_interval_secs: 300,
            startup_delay_secs: 10,
            command_timeout_secs: 30,
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

/// `<tmp>/v2meter/config_runtime.json` — the temp dir is writable even when
/// the daemon's own config directory is not.
pub fn default_runtime_config() -> PathBuf {
    std::env::temp_dir()
        .join(SETTINGS_DIR)
        .join("config_runtime.json")
}

/// `<config dir>/v2meter/settings.yaml`, or `None` if the platform has no
/// config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Load settings from an explicit YAML file.
///
/// Returns `SettingsError::NotFound` if absent, `SettingsError::Parse` (with
/// path + line context) if malformed. An empty file yields the defaults.
pub fn load_at(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Err(SettingsError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load from the default location if a file exists there, else defaults.
pub fn load() -> Result<Settings, SettingsError> {
    match default_path() {
        Some(path) if path.exists() => load_at(&path),
        _ => Ok(Settings::default()),
    }
}
