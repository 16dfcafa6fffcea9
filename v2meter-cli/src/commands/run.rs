//! `v2meter run` — the sidecar proper.

use anyhow::{Context, Result};
use clap::Args;

use v2meter_core::Settings;

/// Arguments for `v2meter run`.
#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        v2meter_daemon::start_blocking(settings).context("v2meter stopped")
    }
}
