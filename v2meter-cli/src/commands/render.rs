//! `v2meter render` — write the runtime config without launching anything.

use anyhow::{Context, Result};
use clap::Args;

use v2meter_config::generate_runtime_config;
use v2meter_core::Settings;

/// Arguments for `v2meter render`.
#[derive(Args, Debug)]
pub struct RenderArgs {}

impl RenderArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let report = generate_runtime_config(settings).with_context(|| {
            format!(
                "failed to generate runtime config from '{}'",
                settings.original_config.display()
            )
        })?;

        println!("✓ Runtime config written to {}", report.path.display());
        if !report.client_updated {
            println!(
                "  warning: no '{}' inbound with clients; identity {} not bound",
                settings.inbound_protocol, settings.identity.uuid
            );
        }
        Ok(())
    }
}
