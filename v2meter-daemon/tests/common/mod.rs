//! Fake daemon / admin executables written into a `TempDir`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use v2meter_core::Settings;
use v2meter_detector::{ApiBinary, DaemonBinary, Dialect};

pub const STATS_RESPONSE: &str = r#"{"stat":[{"name":"user>>>user@v2ray>>>traffic>>>uplink","value":"100"},{"name":"user>>>user@v2ray>>>traffic>>>downlink","value":"50"},{"name":"user>>>other@x>>>traffic>>>uplink","value":"999"}]}"#;

/// Write an executable `#!/bin/sh` script named `name` into `dir`.
pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

/// Admin binary that records its argv and stdin next to itself, then prints
/// `response` and exits with `code`.
pub fn fake_admin(dir: &Path, response: &str, code: i32) -> ApiBinary {
    let body = format!(
        "here=$(dirname \"$0\")\n\
         echo \"$@\" > \"$here/args.txt\"\n\
         cat > \"$here/request.json\"\n\
         date >> \"$here/calls.log\"\n\
         printf '%s' '{response}'\n\
         exit {code}"
    );
    ApiBinary {
        dialect: Dialect::Xray,
        path: Some(script(dir, "xray", &body)),
    }
}

/// Admin binary that logs each call, then takes `delay_secs` to answer with
/// [`STATS_RESPONSE`].
pub fn slow_admin(dir: &Path, delay_secs: u32) -> ApiBinary {
    let body = format!(
        "here=$(dirname \"$0\")\n\
         date >> \"$here/calls.log\"\n\
         cat > /dev/null\n\
         sleep {delay_secs}\n\
         printf '%s' '{STATS_RESPONSE}'"
    );
    ApiBinary {
        dialect: Dialect::Xray,
        path: Some(script(dir, "xray", &body)),
    }
}

pub fn fake_daemon(dir: &Path, body: &str) -> DaemonBinary {
    DaemonBinary {
        dialect: Dialect::Xray,
        path: script(dir, "xray-daemon", body),
    }
}

pub fn admin_calls(dir: &Path) -> usize {
    fs::read_to_string(dir.join("calls.log"))
        .map(|log| log.lines().count())
        .unwrap_or(0)
}

pub fn test_settings(dir: &Path) -> Settings {
    Settings {
        original_config: dir.join("config.json"),
        runtime_config: dir.join("config_runtime.json"),
        poll_interval_secs: 1,
        startup_delay_secs: 0,
        command_timeout_secs: 5,
        http_timeout_secs: 5,
        ..Settings::default()
    }
}
