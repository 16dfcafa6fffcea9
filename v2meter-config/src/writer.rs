//! Read → transform → atomic write.
//!
//! ## `generate_runtime_config` — protocol
//!
//! 1. Read the original config (`NotFound` / `Read` on failure).
//! 2. Parse as JSON (`Malformed` on failure).
//! 3. [`transform`] in memory.
//! 4. Pretty-print with 2-space indentation.
//! 5. Write to `<path>.tmp`, creating the parent directory.
//! 6. Rename to the final path (atomic on POSIX).
//!
//! The original file is never modified.

use std::path::{Path, PathBuf};

use serde_json::Value;

use v2meter_core::Settings;

use crate::error::{write_err, ConfigError};
use crate::transform::transform;

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfigReport {
    pub path: PathBuf,
    pub client_updated: bool,
}

/// Produce the runtime config described by `settings`.
pub fn generate_runtime_config(settings: &Settings) -> Result<RuntimeConfigReport, ConfigError> {
    tracing::info!(
        original = %settings.original_config.display(),
        "generating runtime configuration",
    );

    let mut config = read_original(&settings.original_config)?;
    let outcome = transform(&mut config, settings)?;

    let mut rendered = serde_json::to_string_pretty(&config)?;
    rendered.push('\n');
    atomic_write(&settings.runtime_config, &rendered)?;

    tracing::info!(path = %settings.runtime_config.display(), "runtime config saved");
    Ok(RuntimeConfigReport {
        path: settings.runtime_config.clone(),
        client_updated: outcome.client_updated,
    })
}

fn read_original(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn atomic_write(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }

    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| write_err(&tmp, e))?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(path, e));
    }
    Ok(())
}
