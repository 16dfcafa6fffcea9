//! Error types for v2meter-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file did not exist at the requested path.
    #[error("settings file not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
