//! Metrics Collectors
//!
//! This module turns the output of `ceph pg dump` and `ceph status` into a
//! [`FlatMetricSet`]. Each submodule flattens one part of the documents.
//!
//! # Architecture
//!
//! A collection cycle:
//! - Runs both admin commands through the [`CephClient`] in `CollectionContext`
//! - Decodes their JSON into typed documents
//! - Flattens them with the `collect_*_metrics` functions
//! - Returns a fresh set; nothing is kept between cycles
//!
//! # Error Handling
//!
//! Unlike per-endpoint exporters, a cycle here is all or nothing. An
//! invocation, parse, or shape failure in either command aborts the cycle and
//! no partial set is returned. The caller logs the failure and waits for the
//! next tick.

use crate::ceph::types::{CephStatus, PgDump};
use crate::ceph::{CephClient, CommandRunner, ProcessRunner};
use crate::config::MetricsConfig;
use crate::error::Result;
use crate::flat::FlatMetricSet;
use tracing::{debug, info};

/// Shared context passed to a collection cycle
///
/// All fields are immutable references, so no invariants can be violated.
pub struct CollectionContext<'a, R = ProcessRunner> {
    /// Ceph CLI client bound to one cluster
    pub client: &'a CephClient<R>,
    /// Metrics configuration (namespace prefix, interval)
    pub config: &'a MetricsConfig,
}

impl<R> Clone for CollectionContext<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for CollectionContext<'_, R> {}

// Collector modules
pub mod cluster;
pub mod osd;
pub mod pg;

// Re-export collector functions for convenient access
pub use cluster::collect_cluster_metrics;
pub use osd::collect_osd_metrics;
pub use pg::collect_pg_metrics;

/// Flattens already decoded documents into a metric set
///
/// # Errors
///
/// Returns a shape error if the status document reports an object recovery
/// rate without a byte recovery rate.
pub fn flatten(
    prefix: &str,
    cluster: &str,
    dump: &PgDump,
    status: &CephStatus,
) -> Result<FlatMetricSet> {
    let mut set = FlatMetricSet::new(prefix, cluster);

    collect_pg_metrics(dump, &mut set);
    collect_osd_metrics(dump, &mut set);
    collect_cluster_metrics(status, &mut set)?;

    Ok(set)
}

/// Runs one collection cycle
///
/// # Examples
///
/// ```no_run
/// use ceph_pg_exporter::ceph::CephClient;
/// use ceph_pg_exporter::collectors::{collect, CollectionContext};
/// use ceph_pg_exporter::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let client = CephClient::new(config.ceph.clone());
/// let ctx = CollectionContext { client: &client, config: &config.metrics };
/// let set = collect(&ctx).await?;
/// print!("{}", set);
/// # Ok(())
/// # }
/// ```
pub async fn collect<R: CommandRunner>(ctx: &CollectionContext<'_, R>) -> Result<FlatMetricSet> {
    let cluster = ctx.client.cluster();
    debug!("Collecting metrics from cluster {}", cluster);

    let dump = ctx.client.pg_dump().await?;
    let status = ctx.client.status().await?;

    let set = flatten(&ctx.config.prefix, cluster, &dump, &status)?;

    info!(
        "Collected {} metrics from cluster {} ({} PGs, {} OSDs)",
        set.len(),
        cluster,
        dump.pg_stats.len(),
        dump.osd_stats.len()
    );

    Ok(set)
}
