//! Daemon child process. No restart policy: once it exits, the supervisor
//! exits too.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};

use v2meter_detector::DaemonBinary;

use crate::error::{io_err, DaemonError};

#[derive(Debug)]
pub struct DaemonProcess {
    child: Child,
    binary: DaemonBinary,
}

/// Start `<binary> run -config <config>` with stdout/stderr forwarded to ours.
pub fn launch(binary: &DaemonBinary, config: &Path) -> Result<DaemonProcess, DaemonError> {
    tracing::info!(
        daemon = %binary.path.display(),
        config = %config.display(),
        "starting daemon with runtime config",
    );

    let child = Command::new(&binary.path)
        .args(binary.dialect.launch_args(config))
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| DaemonError::Spawn {
            program: binary.path.clone(),
            source,
        })?;

    tracing::info!(pid = ?child.id(), "daemon started");
    Ok(DaemonProcess {
        child,
        binary: binary.clone(),
    })
}

impl DaemonProcess {
    /// Non-blocking liveness check: `Some(status)` once the child has exited.
    pub fn try_exit(&mut self) -> Result<Option<ExitStatus>, DaemonError> {
        self.child
            .try_wait()
            .map_err(|e| io_err(&self.binary.path, e))
    }

    /// Kill and reap the child.
    pub async fn shutdown(mut self) -> Result<(), DaemonError> {
        if self.try_exit()?.is_some() {
            return Ok(());
        }
        tracing::info!(pid = ?self.child.id(), "stopping daemon");
        self.child
            .kill()
            .await
            .map_err(|e| io_err(&self.binary.path, e))
    }
}
