//! Binary resolution for `v2meter-detector`.
//!
//! Three mutually compatible executables can serve a deployment: `xray`,
//! `v2ray`, and `v2ctl` (the API-only companion shipped with v2ray 4.x).
//! Which one is installed decides two things:
//!
//! - the **daemon** launched against the runtime config (`xray` or `v2ray`)
//! - the **dialect** used for admin API calls (any of the three)
//!
//! Lookups follow the registry-style `_at` pattern: `resolve_api_at(path)`
//! searches an explicit search path, `resolve_api()` uses `$PATH`.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which executable family serves the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Xray,
    V2Ctl,
    V2Ray,
}

impl Dialect {
    /// Search order for the admin API binary, most preferred first.
    pub const PREFERENCE: [Dialect; 3] = [Dialect::Xray, Dialect::V2Ctl, Dialect::V2Ray];

    /// Used when none of [`Dialect::PREFERENCE`] is on the search path.
    pub const FALLBACK: Dialect = Dialect::V2Ray;

    /// Executable name for this dialect.
    pub fn program(self) -> &'static str {
        match self {
            Dialect::Xray => "xray",
            Dialect::V2Ctl => "v2ctl",
            Dialect::V2Ray => "v2ray",
        }
    }

    /// Daemon executable belonging to this dialect. `v2ctl` cannot run a
    /// proxy itself; it ships next to `v2ray`.
    pub fn launch_program(self) -> &'static str {
        match self {
            Dialect::Xray => "xray",
            Dialect::V2Ctl | Dialect::V2Ray => "v2ray",
        }
    }

    /// `run -config <path>`
    pub fn launch_args(self, config: &Path) -> Vec<OsString> {
        vec!["run".into(), "-config".into(), config.as_os_str().to_owned()]
    }

    /// `api --server=<host:port> <Service.Method>`
    pub fn api_args(self, server: &str, method: &str) -> Vec<String> {
        vec![
            "api".to_string(),
            format!("--server={server}"),
            method.to_string(),
        ]
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Admin API binary selected for this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBinary {
    pub dialect: Dialect,
    /// Absolute path when found; `None` means the fallback bare name is used.
    pub path: Option<PathBuf>,
}

impl ApiBinary {
    /// What to hand to `Command::new`.
    pub fn program(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.dialect.program()))
    }
}

/// Daemon binary selected for launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonBinary {
    pub dialect: Dialect,
    pub path: PathBuf,
}

/// Presence of one executable on the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub dialect: Dialect,
    pub path: Option<PathBuf>,
}

/// Errors from binary resolution.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("no runnable daemon binary found (searched for: {searched})")]
    NoDaemonBinary { searched: String },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Select the admin API binary on `search_path`.
///
/// Walks [`Dialect::PREFERENCE`] and returns the first hit. Never fails: with
/// nothing installed it logs a warning and returns [`Dialect::FALLBACK`] with
/// no path.
pub fn resolve_api_at(search_path: &OsStr) -> ApiBinary {
    for dialect in Dialect::PREFERENCE {
        if let Some(path) = find_at(dialect.program(), search_path) {
            tracing::info!(dialect = %dialect, path = %path.display(), "admin API binary selected");
            return ApiBinary {
                dialect,
                path: Some(path),
            };
        }
    }

    tracing::warn!(
        fallback = %Dialect::FALLBACK,
        "none of xray, v2ctl, v2ray found on search path; using fallback name",
    );
    ApiBinary {
        dialect: Dialect::FALLBACK,
        path: None,
    }
}

/// [`resolve_api_at`] against the process `$PATH`.
pub fn resolve_api() -> ApiBinary {
    resolve_api_at(&process_search_path())
}

/// Select the daemon binary on `search_path`: `xray` wins over `v2ray`.
///
/// Returns `DetectError::NoDaemonBinary` when neither exists.
pub fn resolve_daemon_at(search_path: &OsStr) -> Result<DaemonBinary, DetectError> {
    let candidates = [Dialect::Xray, Dialect::V2Ray];
    for dialect in candidates {
        if let Some(path) = find_at(dialect.launch_program(), search_path) {
            return Ok(DaemonBinary { dialect, path });
        }
    }

    Err(DetectError::NoDaemonBinary {
        searched: candidates
            .iter()
            .map(|d| d.launch_program())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// [`resolve_daemon_at`] against the process `$PATH`.
pub fn resolve_daemon() -> Result<DaemonBinary, DetectError> {
    resolve_daemon_at(&process_search_path())
}

/// Report every known executable, found or not, in preference order.
pub fn survey_at(search_path: &OsStr) -> Vec<Presence> {
    Dialect::PREFERENCE
        .iter()
        .map(|&dialect| Presence {
            dialect,
            path: find_at(dialect.program(), search_path),
        })
        .collect()
}

/// [`survey_at`] against the process `$PATH`.
pub fn survey() -> Vec<Presence> {
    survey_at(&process_search_path())
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

fn find_at(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    which::which_in(program, Some(search_path), cwd).ok()
}

fn process_search_path() -> OsString {
    std::env::var_os("PATH").unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
