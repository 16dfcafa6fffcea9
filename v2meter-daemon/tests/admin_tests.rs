//! Admin API sub-process contract, exercised through fake executables.

#![cfg(unix)]

mod common;

use std::fs;

use serde_json::{json, Value};
use tempfile::TempDir;
use v2meter_core::StatsSnapshot;
use v2meter_daemon::admin::QUERY_STATS;
use v2meter_daemon::{AdminClient, AdminError};
use v2meter_detector::{ApiBinary, Dialect};

use common::{admin_calls, fake_admin, script, test_settings, STATS_RESPONSE};

#[tokio::test]
async fn call_passes_server_method_and_json_request_line() {
    let dir = TempDir::new().expect("tempdir");
    let api = fake_admin(dir.path(), r#"{"ok":true}"#, 0);
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    let out = client
        .call(QUERY_STATS, &json!({ "pattern": "user>>>", "reset": false }))
        .await
        .expect("call");
    assert_eq!(out, r#"{"ok":true}"#);

    let args = fs::read_to_string(dir.path().join("args.txt")).expect("args");
    assert_eq!(
        args.trim(),
        "api --server=127.0.0.1:10085 StatsService.QueryStats"
    );

    let request = fs::read_to_string(dir.path().join("request.json")).expect("request");
    assert!(request.ends_with('\n'), "request must be one line");
    let request: Value = serde_json::from_str(request.trim()).expect("request is JSON");
    assert_eq!(request, json!({ "pattern": "user>>>", "reset": false }));
}

#[tokio::test]
async fn query_stats_aggregates_tracked_user() {
    let dir = TempDir::new().expect("tempdir");
    let api = fake_admin(dir.path(), STATS_RESPONSE, 0);
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    let snapshot = client.query_stats("user@v2ray").await;
    assert_eq!(
        snapshot,
        Some(StatsSnapshot {
            uplink: 100,
            downlink: 50
        })
    );
}

#[tokio::test]
async fn non_zero_exit_is_failure_and_yields_no_stats() {
    let dir = TempDir::new().expect("tempdir");
    let api = fake_admin(dir.path(), STATS_RESPONSE, 1);
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    let err = client.call(QUERY_STATS, &json!({})).await.unwrap_err();
    assert!(matches!(err, AdminError::Failed { .. }), "got: {err}");
    assert!(client.query_stats("user@v2ray").await.is_none());
}

#[tokio::test]
async fn empty_output_yields_no_stats() {
    let dir = TempDir::new().expect("tempdir");
    let api = fake_admin(dir.path(), "", 0);
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    let err = client.call(QUERY_STATS, &json!({})).await.unwrap_err();
    assert!(matches!(err, AdminError::EmptyOutput { .. }), "got: {err}");
    assert!(client.query_stats("user@v2ray").await.is_none());
}

#[tokio::test]
async fn malformed_output_yields_no_stats() {
    let dir = TempDir::new().expect("tempdir");
    let api = fake_admin(dir.path(), "stat: <protobuf text>", 0);
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    assert!(client.query_stats("user@v2ray").await.is_none());
    assert_eq!(admin_calls(dir.path()), 1, "no retry within a cycle");
}

#[tokio::test]
async fn child_that_ignores_stdin_is_judged_by_exit_status() {
    let dir = TempDir::new().expect("tempdir");
    let path = script(dir.path(), "v2ctl", "exit 2");
    let api = ApiBinary {
        dialect: Dialect::V2Ctl,
        path: Some(path),
    };
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    let err = client.call(QUERY_STATS, &json!({})).await.unwrap_err();
    assert!(
        matches!(err, AdminError::Failed { .. } | AdminError::Io(_)),
        "got: {err}"
    );
}

#[tokio::test]
async fn hung_admin_call_times_out() {
    let dir = TempDir::new().expect("tempdir");
    let path = script(dir.path(), "xray", "exec sleep 30");
    let api = ApiBinary {
        dialect: Dialect::Xray,
        path: Some(path),
    };
    let mut settings = test_settings(dir.path());
    settings.command_timeout_secs = 1;
    let client = AdminClient::new(&api, &settings);

    let started = std::time::Instant::now();
    let err = client.call(QUERY_STATS, &json!({})).await.unwrap_err();
    assert!(matches!(err, AdminError::Timeout { .. }), "got: {err}");
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[tokio::test]
async fn missing_program_is_spawn_error() {
    let dir = TempDir::new().expect("tempdir");
    let api = ApiBinary {
        dialect: Dialect::Xray,
        path: Some(dir.path().join("absent")),
    };
    let client = AdminClient::new(&api, &test_settings(dir.path()));

    let err = client.call(QUERY_STATS, &json!({})).await.unwrap_err();
    assert!(matches!(err, AdminError::Spawn { .. }), "got: {err}");
}
