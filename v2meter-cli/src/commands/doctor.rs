//! `v2meter doctor` — which daemon binaries can this host run?

use anyhow::{bail, Result};
use clap::Args;

use v2meter_detector::{resolve_api, resolve_daemon, survey};

/// Arguments for `v2meter doctor`.
#[derive(Args, Debug)]
pub struct DoctorArgs {}

impl DoctorArgs {
    pub fn run(self) -> Result<()> {
        let found = survey();
        for presence in &found {
            match &presence.path {
                Some(path) => println!("Found {} at {}", presence.dialect, path.display()),
                None => println!("{} not found", presence.dialect),
            }
        }

        if found.iter().all(|p| p.path.is_none()) {
            bail!("no xray, v2ctl or v2ray binary found on PATH");
        }

        println!("admin API dialect: {}", resolve_api().dialect);
        match resolve_daemon() {
            Ok(daemon) => println!("daemon binary: {}", daemon.path.display()),
            Err(err) => println!("daemon binary: none ({err})"),
        }
        println!("Environment check passed.");
        Ok(())
    }
}
