//! Process runner tests
//!
//! Exercise real child processes using standard Unix utilities in place of
//! the `ceph` binary.

#![cfg(unix)]

use ceph_pg_exporter::ceph::{CephClient, CommandRunner, ProcessRunner};
use ceph_pg_exporter::config::CephConfig;
use std::time::Duration;

fn client_for(binary: &str) -> CephClient {
    CephClient::new(CephConfig {
        cluster: "main".to_string(),
        binary: binary.to_string(),
        command_timeout_seconds: 5,
    })
}

#[tokio::test]
async fn test_runner_returns_stdout() {
    let runner = ProcessRunner::new(None);

    let out = runner.run("echo", &["hello"]).await.expect("echo should run");

    assert_eq!(out.trim(), "hello");
}

#[tokio::test]
async fn test_nonzero_exit_is_invocation_failure() {
    let err = client_for("false").status().await.unwrap_err();

    assert_eq!(err.kind(), "invocation");
    assert!(err.to_string().contains("false --cluster main status --format json"));
}

#[tokio::test]
async fn test_missing_binary_is_invocation_failure() {
    let err = client_for("/nonexistent/ceph").pg_dump().await.unwrap_err();

    assert_eq!(err.kind(), "invocation");
    assert!(err.to_string().contains("failed to spawn"));
}

#[tokio::test]
async fn test_empty_output_is_invocation_failure() {
    let err = client_for("true").status().await.unwrap_err();

    assert_eq!(err.kind(), "invocation");
    assert!(err.to_string().contains("no output captured"));
}

#[tokio::test]
async fn test_non_json_output_is_parse_failure() {
    // `echo` prints its arguments, which is not JSON
    let err = client_for("echo").pg_dump().await.unwrap_err();

    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn test_hung_command_times_out() {
    let runner = ProcessRunner::new(Some(Duration::from_millis(100)));

    let err = runner.run("sleep", &["5"]).await.unwrap_err();

    assert_eq!(err.kind(), "invocation");
    assert!(err.to_string().contains("timed out after 100ms"));
}
