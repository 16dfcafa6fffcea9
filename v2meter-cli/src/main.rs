//! v2meter — stats sidecar for xray / v2ray daemons.
//!
//! # Usage
//!
//! ```text
//! v2meter [run]          generate runtime config, launch daemon, poll + report
//! v2meter render         generate the runtime config only
//! v2meter query          one stats query against a running daemon
//! v2meter doctor         list installed xray / v2ctl / v2ray binaries
//!
//! global: --settings <file> --log-json --original-config <file>
//!         --runtime-config <file> --interval <secs> --startup-delay <secs>
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{doctor::DoctorArgs, query::QueryArgs, render::RenderArgs, run::RunArgs};
use v2meter_core::{settings, Settings};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "v2meter",
    version,
    about = "Enable the stats API of an xray/v2ray daemon, supervise it, and report per-user traffic",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the runtime config, launch the daemon, and poll until it exits (default).
    Run(RunArgs),

    /// Generate the runtime config and exit.
    Render(RenderArgs),

    /// Query the running daemon's stats once and print the snapshot as JSON.
    Query(QueryArgs),

    /// Check which daemon binaries are installed.
    Doctor(DoctorArgs),
}

// ---------------------------------------------------------------------------
// Settings overrides shared by every subcommand
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
struct GlobalArgs {
    /// YAML settings file (default: <config dir>/v2meter/settings.yaml if present).
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    /// Daemon config to read.
    #[arg(long, global = true, value_name = "FILE")]
    original_config: Option<PathBuf>,

    /// Where to write the generated daemon config.
    #[arg(long, global = true, value_name = "FILE")]
    runtime_config: Option<PathBuf>,

    /// Seconds between stats polls.
    #[arg(long, global = true, value_name = "SECS")]
    interval: Option<u64>,

    /// Seconds to wait after launch before the first poll.
    #[arg(long, global = true, value_name = "SECS")]
    startup_delay: Option<u64>,
}

impl GlobalArgs {
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => settings::load_at(path)
                .with_context(|| format!("cannot load settings from '{}'", path.display()))?,
            None => settings::load().context("cannot load default settings file")?,
        };

        if let Some(path) = &self.original_config {
            settings.original_config = path.clone();
        }
        if let Some(path) = &self.runtime_config {
            settings.runtime_config = path.clone();
        }
        if let Some(secs) = self.interval {
            settings.poll_interval_secs = secs;
        }
        if let Some(secs) = self.startup_delay {
            settings.startup_delay_secs = secs;
        }
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    v2meter_daemon::init_tracing(cli.global.log_json);

    let settings = cli.global.load_settings()?;
    match cli.command.unwrap_or(Commands::Run(RunArgs {})) {
        Commands::Run(args) => args.run(&settings),
        Commands::Render(args) => args.run(&settings),
        Commands::Query(args) => args.run(&settings),
        Commands::Doctor(args) => args.run(),
    }
}
