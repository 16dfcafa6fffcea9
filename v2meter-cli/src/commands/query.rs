//! `v2meter query` — one-shot stats query.

use anyhow::{bail, Context, Result};
use clap::Args;

use v2meter_core::Settings;

/// Arguments for `v2meter query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Pretty-print the snapshot.
    #[arg(long)]
    pub pretty: bool,
}

impl QueryArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let Some(snapshot) = v2meter_daemon::query_blocking(settings)? else {
            bail!(
                "no stats available from admin API at {}",
                settings.api.server()
            );
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&snapshot)
        } else {
            serde_json::to_string(&snapshot)
        }
        .context("failed to render snapshot JSON")?;
        println!("{rendered}");
        Ok(())
    }
}
