//! Admin API client: one sub-process per call.
//!
//! ```text
//! <program> api --server=<host:port> <Service.Method>
//!   stdin  <- request as one JSON line, then closed
//!   stdout -> full JSON response
//! ```
//!
//! Non-zero exit or empty stdout is a failure. The whole exchange is bounded
//! by the configured command timeout; a timed-out child is killed on drop.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

use v2meter_core::{Settings, StatsSnapshot};
use v2meter_detector::{ApiBinary, Dialect};

use crate::error::AdminError;
use crate::stats;

pub const QUERY_STATS: &str = "StatsService.QueryStats";
pub const USER_PATTERN: &str = "user>>>";

#[derive(Debug, Clone)]
pub struct AdminClient {
    program: PathBuf,
    dialect: Dialect,
    server: String,
    timeout: Duration,
}

impl AdminClient {
    pub fn new(api: &ApiBinary, settings: &Settings) -> Self {
        Self {
            program: api.program(),
            dialect: api.dialect,
            server: settings.api.server(),
            timeout: settings.command_timeout(),
        }
    }

    /// Invoke `method` with `request` and return its raw stdout.
    pub async fn call(&self, method: &str, request: &Value) -> Result<String, AdminError> {
        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');

        let child = Command::new(&self.program)
            .args(self.dialect.api_args(&self.server, method))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AdminError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, exchange(child, line))
            .await
            .map_err(|_| AdminError::Timeout {
                method: method.to_string(),
                after: self.timeout,
            })??;

        if !output.status.success() {
            return Err(AdminError::Failed {
                method: method.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(AdminError::EmptyOutput {
                method: method.to_string(),
            });
        }
        Ok(stdout)
    }

    /// Query the cumulative counters of `email` without resetting them.
    ///
    /// Every failure is logged and collapses to `None`: the caller skips the
    /// cycle.
    pub async fn query_stats(&self, email: &str) -> Option<StatsSnapshot> {
        let request = json!({ "pattern": USER_PATTERN, "reset": false });
        let raw = match self.call(QUERY_STATS, &request).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "stats query failed; skipping cycle");
                return None;
            }
        };

        match stats::aggregate(&raw, email) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(error = %err, "error parsing stats; skipping cycle");
                None
            }
        }
    }
}

async fn exchange(mut child: Child, line: Vec<u8>) -> std::io::Result<Output> {
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(&line).await {
            // The exit status is the verdict if the child quits before reading.
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
            other => other?,
        }
    }
    child.wait_with_output().await
}
