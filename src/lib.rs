//! Ceph PG Prometheus Exporter
//!
//! Periodically queries a Ceph cluster through its `ceph` admin CLI and
//! republishes placement group, OSD, and cluster throughput figures.
//!
//! # Overview
//!
//! Every interval the exporter runs `ceph pg dump` and `ceph status` (both with
//! `--format json`), flattens the documents into a [`flat::FlatMetricSet`], and
//! exposes the result in Prometheus format and as dotted `name value` lines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ceph --cluster X   ┌──────────────┐
//! │    Ceph     │ ◄─────────────────   │   Exporter   │
//! │   cluster   │   JSON on stdout     │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │ Client │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Flatten │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`ceph`] - CLI invocation and JSON document types
//! - [`collectors`] - Flattening of PG, OSD, and cluster figures
//! - [`flat`] - The per-cycle flat metric set
//! - [`metrics`] - Prometheus metric definitions
//! - [`server`] - HTTP server and collection loop
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use ceph_pg_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod ceph;
pub mod collectors;
pub mod config;
pub mod error;
pub mod flat;
pub mod metrics;
pub mod server;
