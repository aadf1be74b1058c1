//! Ceph CLI Client
//!
//! Runs read-only `ceph` admin commands against one cluster and decodes their
//! JSON output.
//!
//! # Architecture
//!
//! - **Invocation**: `<binary> --cluster <name> <subcommand...> --format json`
//! - **Runner**: process spawning sits behind [`CommandRunner`]; production code
//!   uses [`ProcessRunner`], tests substitute canned output
//! - **Decoding**: raw text → `serde_json::Value` (parse errors) → typed
//!   document (shape errors)
//!
//! # Example
//!
//! ```no_run
//! use ceph_pg_exporter::ceph::CephClient;
//! use ceph_pg_exporter::config::CephConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = CephClient::new(CephConfig::default());
//! let dump = client.pg_dump().await?;
//! println!("{} placement groups", dump.pg_stats.len());
//! # Ok(())
//! # }
//! ```

use crate::ceph::types::{CephStatus, PgDump};
use crate::config::CephConfig;
use crate::error::{ExporterError, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runs an external program and returns its standard output.
///
/// Implementations must report a nonzero exit, a spawn failure, or empty
/// output as [`ExporterError::Invocation`].
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<String>> + Send;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = command_line(program, args);
        debug!("Running {}", command);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| ExporterError::Invocation {
                    command: command.clone(),
                    reason: format!("timed out after {:?}", limit),
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| ExporterError::Invocation {
            command: command.clone(),
            reason: format!("failed to spawn: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExporterError::Invocation {
                command,
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(ExporterError::Invocation {
                command,
                reason: "no output captured".to_string(),
            });
        }

        Ok(stdout)
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Client for one Ceph cluster's admin CLI
pub struct CephClient<R = ProcessRunner> {
    config: CephConfig,
    runner: R,
}

impl CephClient<ProcessRunner> {
    pub fn new(config: CephConfig) -> Self {
        let runner = ProcessRunner::new(config.command_timeout());
        Self { config, runner }
    }
}

impl<R: CommandRunner> CephClient<R> {
    pub fn with_runner(config: CephConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn cluster(&self) -> &str {
        &self.config.cluster
    }

    /// Query placement group and OSD statistics (`pg dump`)
    pub async fn pg_dump(&self) -> Result<PgDump> {
        self.execute_query(&["pg", "dump"]).await
    }

    /// Query overall cluster status (`status`)
    pub async fn status(&self) -> Result<CephStatus> {
        self.execute_query(&["status"]).await
    }

    /// Run `<binary> --cluster <name> <subcommand> --format json` and decode
    /// the output into `T`.
    async fn execute_query<T>(&self, subcommand: &[&str]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut args = vec!["--cluster", self.config.cluster.as_str()];
        args.extend_from_slice(subcommand);
        args.extend_from_slice(&["--format", "json"]);

        let raw = self.runner.run(&self.config.binary, &args).await?;
        decode(&subcommand.join(" "), &raw)
    }
}

/// Decode raw command output, keeping malformed JSON and unexpected
/// structure apart.
pub fn decode<T: DeserializeOwned>(command: &str, raw: &str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| ExporterError::Parse {
            command: command.to_string(),
            source,
        })?;

    serde_json::from_value(value).map_err(|e| ExporterError::Shape {
        command: command.to_string(),
        reason: e.to_string(),
    })
}
