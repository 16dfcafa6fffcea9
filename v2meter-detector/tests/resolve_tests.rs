//! Binary resolution against isolated search paths.
//!
//! Each case builds its own `TempDir` of fake executables — no shared state,
//! and the real `$PATH` is never consulted.

use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;
use v2meter_detector::{resolve_api_at, resolve_daemon_at, survey_at, DetectError, Dialect};

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn bin_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for name in names {
        install(dir.path(), name);
    }
    dir
}

fn install(dir: &Path, name: &str) {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write fake binary");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    }
}

// ---------------------------------------------------------------------------
// Admin API dialect
// ---------------------------------------------------------------------------

#[rstest]
#[case(&["xray", "v2ctl", "v2ray"], Dialect::Xray)]
#[case(&["v2ctl", "v2ray"], Dialect::V2Ctl)]
#[case(&["v2ray", "xray"], Dialect::Xray)]
#[case(&["v2ray"], Dialect::V2Ray)]
#[case(&["v2ctl"], Dialect::V2Ctl)]
fn api_dialect_follows_preference(#[case] installed: &[&str], #[case] expected: Dialect) {
    let dir = bin_dir(installed);
    let api = resolve_api_at(dir.path().as_os_str());
    assert_eq!(api.dialect, expected);
    assert_eq!(
        api.path.as_deref(),
        Some(dir.path().join(expected.program()).as_path())
    );
}

#[test]
fn api_dialect_falls_back_to_bare_v2ray() {
    let dir = bin_dir(&[]);
    let api = resolve_api_at(dir.path().as_os_str());
    assert_eq!(api.dialect, Dialect::V2Ray);
    assert!(api.path.is_none());
    assert_eq!(api.program(), Path::new("v2ray"));
}

#[cfg(unix)]
#[test]
fn non_executable_file_is_ignored() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("xray"), "not a program").expect("write");
    install(dir.path(), "v2ray");
    let api = resolve_api_at(dir.path().as_os_str());
    assert_eq!(api.dialect, Dialect::V2Ray);
}

// ---------------------------------------------------------------------------
// Daemon launch binary
// ---------------------------------------------------------------------------

#[rstest]
#[case(&["xray", "v2ray"], Dialect::Xray)]
#[case(&["v2ray", "v2ctl"], Dialect::V2Ray)]
#[case(&["xray"], Dialect::Xray)]
fn daemon_prefers_xray(#[case] installed: &[&str], #[case] expected: Dialect) {
    let dir = bin_dir(installed);
    let daemon = resolve_daemon_at(dir.path().as_os_str()).expect("resolve daemon");
    assert_eq!(daemon.dialect, expected);
    assert_eq!(daemon.path, dir.path().join(expected.launch_program()));
}

#[rstest]
#[case(&[])]
#[case(&["v2ctl"])]
fn daemon_missing_is_an_error(#[case] installed: &[&str]) {
    let dir = bin_dir(installed);
    let err = resolve_daemon_at(dir.path().as_os_str()).unwrap_err();
    assert!(matches!(err, DetectError::NoDaemonBinary { .. }));
    assert!(err.to_string().contains("xray, v2ray"), "got: {err}");
}

// ---------------------------------------------------------------------------
// Survey
// ---------------------------------------------------------------------------

#[test]
fn survey_lists_all_three_in_preference_order() {
    let dir = bin_dir(&["v2ctl"]);
    let found = survey_at(dir.path().as_os_str());
    let dialects: Vec<_> = found.iter().map(|p| p.dialect).collect();
    assert_eq!(dialects, Dialect::PREFERENCE.to_vec());
    assert!(found[0].path.is_none());
    assert!(found[1].path.is_some());
    assert!(found[2].path.is_none());
}
