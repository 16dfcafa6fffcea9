use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use v2meter_core::{Settings, StatsSnapshot};
use v2meter_detector::{resolve_api, resolve_daemon};

use crate::admin::AdminClient;
use crate::error::{io_err, DaemonError};
use crate::report::{HttpReporter, UsageSink};
use crate::supervisor::{launch, DaemonProcess};

/// Outcome of one polling iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The daemon was found dead; no query was made.
    DaemonExited(ExitStatus),
    /// No usable stats this cycle.
    Skipped,
    /// Snapshot delivered; collector answered `status`.
    Reported { snapshot: StatsSnapshot, status: u16 },
    /// Snapshot obtained but delivery failed; it is not retried.
    ReportFailed { snapshot: StatsSnapshot },
}

enum Stop {
    Exited(ExitStatus),
    Interrupted,
}

/// Running-state loop around one supervised daemon.
pub struct Poller {
    daemon: DaemonProcess,
    admin: AdminClient,
    sink: Arc<dyn UsageSink>,
    email: String,
    interval: Duration,
    startup_delay: Duration,
}

impl Poller {
    pub fn new(
        settings: &Settings,
        daemon: DaemonProcess,
        admin: AdminClient,
        sink: Arc<dyn UsageSink>,
    ) -> Self {
        Self {
            daemon,
            admin,
            sink,
            email: settings.identity.email.clone(),
            interval: settings.poll_interval(),
            startup_delay: settings.startup_delay(),
        }
    }

    /// One iteration: liveness check, stats query, report.
    pub async fn tick(&mut self) -> Result<Tick, DaemonError> {
        if let Some(status) = self.daemon.try_exit()? {
            tracing::error!(%status, "daemon process exited");
            return Ok(Tick::DaemonExited(status));
        }

        let Some(snapshot) = self.admin.query_stats(&self.email).await else {
            return Ok(Tick::Skipped);
        };

        let sink = Arc::clone(&self.sink);
        let delivery = tokio::task::spawn_blocking(move || sink.report(&snapshot))
            .await
            .map_err(|err| DaemonError::Runtime(format!("report task join error: {err}")))?;

        match delivery {
            Ok(status) => {
                tracing::info!(status, %snapshot, "report success");
                Ok(Tick::Reported { snapshot, status })
            }
            Err(err) => {
                tracing::warn!(error = %err, %snapshot, "error reporting stats");
                Ok(Tick::ReportFailed { snapshot })
            }
        }
    }

    /// Poll until the daemon dies (`Err(DaemonExited)`) or ctrl-c arrives
    /// (daemon killed, `Ok(())`).
    pub async fn run(mut self) -> Result<(), DaemonError> {
        let stop = tokio::select! {
            exited = self.poll_until_exit() => Stop::Exited(exited?),
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| io_err("ctrl-c handler", e))?;
                Stop::Interrupted
            }
        };

        match stop {
            Stop::Exited(status) => Err(DaemonError::DaemonExited { status }),
            Stop::Interrupted => {
                tracing::info!("received ctrl-c, shutting down");
                self.daemon.shutdown().await
            }
        }
    }

    /// Kill the daemon without waiting for the loop.
    pub async fn shutdown(self) -> Result<(), DaemonError> {
        self.daemon.shutdown().await
    }

    async fn poll_until_exit(&mut self) -> Result<ExitStatus, DaemonError> {
        if !self.startup_delay.is_zero() {
            tracing::info!(delay_secs = self.startup_delay.as_secs(), "waiting for daemon startup");
            tokio::time::sleep(self.startup_delay).await;
        }

        // The interval is the idle gap after each iteration, however long
        // the admin and report calls took.
        loop {
            if let Tick::DaemonExited(status) = self.tick().await? {
                return Ok(status);
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Full sidecar lifecycle on a current-thread runtime; blocks until it ends.
pub fn start_blocking(settings: &Settings) -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings))
}

/// Resolve binaries, write the runtime config, launch the daemon, poll.
pub async fn run(settings: &Settings) -> Result<(), DaemonError> {
    let api = resolve_api();
    let report = v2meter_config::generate_runtime_config(settings)?;
    let binary = resolve_daemon()?;
    let daemon = launch(&binary, &report.path)?;

    tracing::info!(
        interval_secs = settings.poll_interval().as_secs(),
        dialect = %api.dialect,
        "polling stats",
    );
    let admin = AdminClient::new(&api, settings);
    let sink: Arc<dyn UsageSink> = Arc::new(HttpReporter::new(settings));
    Poller::new(settings, daemon, admin, sink).run().await
}

/// One stats query against an already running daemon.
pub fn query_blocking(settings: &Settings) -> Result<Option<StatsSnapshot>, DaemonError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    let admin = AdminClient::new(&resolve_api(), settings);
    Ok(runtime.block_on(admin.query_stats(&settings.identity.email)))
}

/// Install the global subscriber: `RUST_LOG` filter (default `info`), plain
/// or JSON lines on stderr. Stdout belongs to command output.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
