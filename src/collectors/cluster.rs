//! Cluster Metrics Collector
//!
//! Collects cluster-wide client throughput, recovery rates, and the number of
//! blocked requests from `ceph status`.
//!
//! # Metrics Produced
//! Under `<namespace>.cluster`:
//! - `read_bytes_sec`, `write_bytes_sec`, `op_per_sec` - Always present
//! - `recovering_objects`, `recovering_bytes` - Only while recovery is running
//! - `slow_requests` - Only when a health summary reports blocked requests

use crate::ceph::types::{CephStatus, Health, PgMap};
use crate::error::{ExporterError, Result};
use crate::flat::{Category, FlatMetricSet};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static BLOCKED_REQUESTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+ requests are blocked").expect("blocked requests pattern is valid")
});

static LEADING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("leading count pattern is valid"));

fn collect_throughput(pgmap: &PgMap, set: &mut FlatMetricSet) -> Result<()> {
    set.set(Category::Cluster, "read_bytes_sec", pgmap.read_bytes_sec);
    set.set(Category::Cluster, "write_bytes_sec", pgmap.write_bytes_sec);
    set.set(Category::Cluster, "op_per_sec", pgmap.op_per_sec);

    if let Some(objects) = pgmap.recovering_objects_per_sec {
        let bytes = pgmap
            .recovering_bytes_per_sec
            .ok_or_else(|| ExporterError::Shape {
                command: "status".to_string(),
                reason: "pgmap has recovering_objects_per_sec but no recovering_bytes_per_sec"
                    .to_string(),
            })?;
        set.set(Category::Cluster, "recovering_objects", objects);
        set.set(Category::Cluster, "recovering_bytes", bytes);
    }

    Ok(())
}

/// Extracts the count from a summary like `"137 requests are blocked > 32 sec"`
///
/// The count is the integer the summary starts with. Summaries that do not
/// mention blocked requests yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`ExporterError::Shape`] when a blocked-requests summary does not
/// start with a count.
pub fn blocked_requests(summary: &str) -> Result<Option<u64>> {
    if !BLOCKED_REQUESTS.is_match(summary) {
        return Ok(None);
    }

    let digits = LEADING_COUNT
        .find(summary)
        .ok_or_else(|| ExporterError::Shape {
            command: "status".to_string(),
            reason: format!("blocked requests summary without leading count: '{}'", summary),
        })?
        .as_str();

    match digits.parse() {
        Ok(count) => Ok(Some(count)),
        Err(e) => {
            warn!("Ignoring blocked requests count '{}': {}", digits, e);
            Ok(None)
        }
    }
}

fn collect_slow_requests(health: &Health, set: &mut FlatMetricSet) -> Result<()> {
    let Some(summaries) = &health.summary else {
        return Ok(());
    };

    // Every match overwrites the previous one
    for entry in summaries {
        if let Some(count) = blocked_requests(&entry.summary)? {
            set.set(Category::Cluster, "slow_requests", count);
        }
    }

    Ok(())
}

/// Collects cluster-wide figures from a status document
///
/// # Errors
///
/// Returns [`ExporterError::Shape`] when the object recovery rate is reported
/// without the matching byte rate, or a blocked-requests summary has no
/// leading count.
pub fn collect_cluster_metrics(status: &CephStatus, set: &mut FlatMetricSet) -> Result<()> {
    collect_throughput(&status.pgmap, set)?;
    collect_slow_requests(&status.health, set)?;
    Ok(())
}
