use crate::error::ExporterError;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

static CLUSTER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("cluster name pattern is valid")
});

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub ceph: CephConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CephConfig {
    /// Value passed to `ceph --cluster`
    #[serde(default = "default_cluster")]
    pub cluster: String,
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Per-command limit; 0 waits forever
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_scrape_interval")]
    pub scrape_interval_seconds: u64,
    /// Namespace prefix for flat metric names (`<prefix>-<cluster>.pg.active`)
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_cluster() -> String {
    "ceph".to_string()
}

fn default_binary() -> String {
    "ceph".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9128
}

fn default_scrape_interval() -> u64 {
    10
}

fn default_prefix() -> String {
    "ceph".to_string()
}

impl Default for CephConfig {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
            binary: default_binary(),
            command_timeout_seconds: default_command_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            scrape_interval_seconds: default_scrape_interval(),
            prefix: default_prefix(),
        }
    }
}

impl CephConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.command_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CEPH_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Checks values that serde cannot, after CLI overrides are applied.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !CLUSTER_NAME.is_match(&self.ceph.cluster) {
            return Err(ExporterError::Config(format!(
                "invalid cluster name '{}': expected letters, digits, '.', '_' or '-'",
                self.ceph.cluster
            )));
        }
        if self.ceph.binary.trim().is_empty() {
            return Err(ExporterError::Config(
                "ceph binary must not be empty".to_string(),
            ));
        }
        if self.metrics.prefix.is_empty() {
            return Err(ExporterError::Config(
                "metric prefix must not be empty".to_string(),
            ));
        }
        if self.metrics.scrape_interval_seconds == 0 {
            return Err(ExporterError::Config(
                "scrape interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
