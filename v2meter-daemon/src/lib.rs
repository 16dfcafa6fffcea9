//! Supervisor runtime: launch the proxy daemon, poll its stats API, report usage.

pub mod admin;
mod error;
pub mod report;
mod runtime;
pub mod stats;
pub mod supervisor;

pub use admin::AdminClient;
pub use error::{AdminError, DaemonError, ReportError, StatsError};
pub use report::{HttpReporter, UsageSink};
pub use runtime::{init_tracing, query_blocking, run, start_blocking, Poller, Tick};
pub use supervisor::{launch, DaemonProcess};
