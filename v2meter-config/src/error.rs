//! Error types for v2meter-config.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while producing the runtime config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The original daemon config does not exist.
    #[error("original config not found at {path}")]
    NotFound { path: PathBuf },

    /// The original daemon config exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The original daemon config is not valid JSON.
    #[error("failed to parse original config at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but a field the transformer must edit has the wrong type.
    #[error("unexpected config shape: `{field}` must be {expected}")]
    InvalidShape {
        field: &'static str,
        expected: &'static str,
    },

    /// Serializing the transformed config failed.
    #[error("failed to serialize runtime config: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the runtime config (or its temp file) failed.
    #[error("failed to write runtime config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn write_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Write {
        path: path.into(),
        source,
    }
}
