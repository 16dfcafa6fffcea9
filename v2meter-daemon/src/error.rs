use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Error surface for the supervisor runtime. Everything here is fatal.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("runtime config error: {0}")]
    Config(#[from] v2meter_config::ConfigError),

    #[error("{0}")]
    Detect(#[from] v2meter_detector::DetectError),

    #[error("failed to launch daemon {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("supervised daemon exited ({status})")]
    DaemonExited { status: ExitStatus },

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Admin API sub-process failures. Transient: the cycle is skipped.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("failed to spawn admin command {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("admin command I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode admin request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("admin call {method} failed ({status}): {stderr}")]
    Failed {
        method: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("admin call {method} produced no output")]
    EmptyOutput { method: String },

    #[error("admin call {method} timed out after {after:?}")]
    Timeout { method: String, after: Duration },
}

/// Stats response that cannot be aggregated. Transient.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("malformed stats response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("counter {name} has non-integer value {value:?}")]
    InvalidValue { name: String, value: String },
}

/// Usage report delivery failures. Transient: the report is dropped.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("collector answered HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
