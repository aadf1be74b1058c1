//! Prometheus Metrics Definitions
//!
//! This module defines all Prometheus metrics exposed by the Ceph exporter and
//! maps a [`FlatMetricSet`] onto them.
//!
//! # Metric Categories
//!
//! ## Placement Groups
//! - `ceph_pg_state_count` - PG count per state token
//!
//! ## OSDs
//! - Capacity (`kb_used`, `kb_total`)
//! - Snapshot trimming queue and activity
//! - Filestore apply/commit latency
//!
//! ## Cluster
//! - Client read/write throughput and operations per second
//! - Recovery rates (only while recovering)
//! - Blocked request count
//!
//! ## Exporter
//! - `ceph_up` - Whether the last collection cycle succeeded
//! - `ceph_collection_failures_total` - Failed cycles by error kind
//!
//! All metrics use the `ceph_` namespace prefix and carry a `cluster` label.

use crate::flat::{Category, FlatMetricSet, MetricKey};
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Metrics collector for Ceph
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    // Placement group metrics
    pub pg_state_count: Arc<GaugeVec>,

    // OSD metrics
    pub osd_kb_used: Arc<GaugeVec>,
    pub osd_kb_total: Arc<GaugeVec>,
    pub osd_snap_trim_queue_len: Arc<GaugeVec>,
    pub osd_num_snap_trimming: Arc<GaugeVec>,
    pub osd_apply_latency_ms: Arc<GaugeVec>,
    pub osd_commit_latency_ms: Arc<GaugeVec>,

    // Cluster metrics
    pub cluster_read_bytes_sec: Arc<GaugeVec>,
    pub cluster_write_bytes_sec: Arc<GaugeVec>,
    pub cluster_op_per_sec: Arc<GaugeVec>,
    pub cluster_recovering_objects: Arc<GaugeVec>,
    pub cluster_recovering_bytes: Arc<GaugeVec>,
    pub cluster_slow_requests: Arc<GaugeVec>,

    // Exporter health
    pub up: Arc<Gauge>,
    pub collection_failures: Arc<IntCounterVec>,

    // Keys exported by the last publish, for stale series removal
    published: Arc<Mutex<Option<PublishedSet>>>,
}

struct PublishedSet {
    cluster: String,
    keys: BTreeSet<MetricKey>,
}

fn gauge_vec(name: &str, help: &str, labels: &[&str]) -> prometheus::Result<GaugeVec> {
    GaugeVec::new(Opts::new(name, help).namespace("ceph"), labels)
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let pg_state_count = gauge_vec(
            "pg_state_count",
            "Number of placement groups whose state contains the given token",
            &["cluster", "state"],
        )?;

        // OSD metrics
        let osd_kb_used = gauge_vec("osd_kb_used", "Used OSD capacity in KiB", &["cluster", "osd"])?;

        let osd_kb_total = gauge_vec(
            "osd_kb_total",
            "Total OSD capacity in KiB",
            &["cluster", "osd"],
        )?;

        let osd_snap_trim_queue_len = gauge_vec(
            "osd_snap_trim_queue_len",
            "Placement groups queued for snapshot trimming on the OSD",
            &["cluster", "osd"],
        )?;

        let osd_num_snap_trimming = gauge_vec(
            "osd_num_snap_trimming",
            "Placement groups currently trimming snapshots on the OSD",
            &["cluster", "osd"],
        )?;

        let osd_apply_latency_ms = gauge_vec(
            "osd_apply_latency_ms",
            "OSD filestore apply latency in milliseconds",
            &["cluster", "osd"],
        )?;

        let osd_commit_latency_ms = gauge_vec(
            "osd_commit_latency_ms",
            "OSD filestore commit latency in milliseconds",
            &["cluster", "osd"],
        )?;

        // Cluster metrics
        let cluster_read_bytes_sec = gauge_vec(
            "cluster_read_bytes_sec",
            "Client read throughput in bytes per second",
            &["cluster"],
        )?;

        let cluster_write_bytes_sec = gauge_vec(
            "cluster_write_bytes_sec",
            "Client write throughput in bytes per second",
            &["cluster"],
        )?;

        let cluster_op_per_sec = gauge_vec(
            "cluster_op_per_sec",
            "Client operations per second",
            &["cluster"],
        )?;

        let cluster_recovering_objects = gauge_vec(
            "cluster_recovering_objects",
            "Objects recovered per second (absent when not recovering)",
            &["cluster"],
        )?;

        let cluster_recovering_bytes = gauge_vec(
            "cluster_recovering_bytes",
            "Bytes recovered per second (absent when not recovering)",
            &["cluster"],
        )?;

        let cluster_slow_requests = gauge_vec(
            "cluster_slow_requests",
            "Requests reported as blocked by the cluster health summary",
            &["cluster"],
        )?;

        let up = Gauge::new(
            "ceph_up",
            "Whether the last collection cycle succeeded (1=up, 0=down)",
        )?;

        let collection_failures = IntCounterVec::new(
            Opts::new(
                "collection_failures_total",
                "Collection cycles aborted, by error kind",
            )
            .namespace("ceph"),
            &["cluster", "kind"],
        )?;

        // Register all metrics
        registry.register(Box::new(pg_state_count.clone()))?;
        registry.register(Box::new(osd_kb_used.clone()))?;
        registry.register(Box::new(osd_kb_total.clone()))?;
        registry.register(Box::new(osd_snap_trim_queue_len.clone()))?;
        registry.register(Box::new(osd_num_snap_trimming.clone()))?;
        registry.register(Box::new(osd_apply_latency_ms.clone()))?;
        registry.register(Box::new(osd_commit_latency_ms.clone()))?;
        registry.register(Box::new(cluster_read_bytes_sec.clone()))?;
        registry.register(Box::new(cluster_write_bytes_sec.clone()))?;
        registry.register(Box::new(cluster_op_per_sec.clone()))?;
        registry.register(Box::new(cluster_recovering_objects.clone()))?;
        registry.register(Box::new(cluster_recovering_bytes.clone()))?;
        registry.register(Box::new(cluster_slow_requests.clone()))?;
        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(collection_failures.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            pg_state_count: Arc::new(pg_state_count),
            osd_kb_used: Arc::new(osd_kb_used),
            osd_kb_total: Arc::new(osd_kb_total),
            osd_snap_trim_queue_len: Arc::new(osd_snap_trim_queue_len),
            osd_num_snap_trimming: Arc::new(osd_num_snap_trimming),
            osd_apply_latency_ms: Arc::new(osd_apply_latency_ms),
            osd_commit_latency_ms: Arc::new(osd_commit_latency_ms),
            cluster_read_bytes_sec: Arc::new(cluster_read_bytes_sec),
            cluster_write_bytes_sec: Arc::new(cluster_write_bytes_sec),
            cluster_op_per_sec: Arc::new(cluster_op_per_sec),
            cluster_recovering_objects: Arc::new(cluster_recovering_objects),
            cluster_recovering_bytes: Arc::new(cluster_recovering_bytes),
            cluster_slow_requests: Arc::new(cluster_slow_requests),
            up: Arc::new(up),
            collection_failures: Arc::new(collection_failures),
            published: Arc::new(Mutex::new(None)),
        })
    }

    fn osd_gauge(&self, field: &str) -> Option<&GaugeVec> {
        match field {
            "kb_used" => Some(self.osd_kb_used.as_ref()),
            "kb_total" => Some(self.osd_kb_total.as_ref()),
            "snap_trim_queue_len" => Some(self.osd_snap_trim_queue_len.as_ref()),
            "num_snap_trimming" => Some(self.osd_num_snap_trimming.as_ref()),
            "apply_latency_ms" => Some(self.osd_apply_latency_ms.as_ref()),
            "commit_latency_ms" => Some(self.osd_commit_latency_ms.as_ref()),
            _ => None,
        }
    }

    fn cluster_gauge(&self, field: &str) -> Option<&GaugeVec> {
        match field {
            "read_bytes_sec" => Some(self.cluster_read_bytes_sec.as_ref()),
            "write_bytes_sec" => Some(self.cluster_write_bytes_sec.as_ref()),
            "op_per_sec" => Some(self.cluster_op_per_sec.as_ref()),
            "recovering_objects" => Some(self.cluster_recovering_objects.as_ref()),
            "recovering_bytes" => Some(self.cluster_recovering_bytes.as_ref()),
            "slow_requests" => Some(self.cluster_slow_requests.as_ref()),
            _ => None,
        }
    }

    /// Gauge and label values a flat metric is exported under
    fn series(&self, cluster: &str, key: &MetricKey) -> Option<(&GaugeVec, Vec<String>)> {
        match key.category {
            Category::Pg => Some((
                self.pg_state_count.as_ref(),
                vec![cluster.to_string(), key.field.clone()],
            )),
            Category::Osd(id) => self
                .osd_gauge(&key.field)
                .map(|gauge| (gauge, vec![cluster.to_string(), id.to_string()])),
            Category::Cluster => self
                .cluster_gauge(&key.field)
                .map(|gauge| (gauge, vec![cluster.to_string()])),
        }
    }

    /// Replace all Ceph series with the contents of `set`
    ///
    /// Series present in `set` are updated in place; series exported by the
    /// previous publish but missing from `set` (OSDs, states, optional cluster
    /// fields) are removed afterwards. A concurrent scrape never sees the
    /// shared series missing.
    pub fn publish(&self, set: &FlatMetricSet) {
        let cluster = set.cluster();
        for (key, value) in set.iter() {
            match self.series(cluster, key) {
                Some((gauge, labels)) => {
                    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                    self.set_gauge(gauge, &labels, value.as_f64());
                }
                None => debug!("No Prometheus series for {} field {}", key.category, key.field),
            }
        }

        let keys: BTreeSet<MetricKey> = set.iter().map(|(key, _)| key.clone()).collect();
        let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = published.take() {
            let same_cluster = previous.cluster == cluster;
            for key in previous
                .keys
                .iter()
                .filter(|key| !same_cluster || !keys.contains(*key))
            {
                self.remove_series(&previous.cluster, key);
            }
        }
        *published = Some(PublishedSet {
            cluster: cluster.to_string(),
            keys,
        });
    }

    fn remove_series(&self, cluster: &str, key: &MetricKey) {
        if let Some((gauge, labels)) = self.series(cluster, key) {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            if let Err(e) = gauge.remove_label_values(&labels) {
                debug!("Stale series {:?} already gone: {}", labels, e);
            }
        }
    }

    /// Record an aborted cycle of the given error kind
    pub fn record_failure(&self, cluster: &str, kind: &str) {
        self.collection_failures
            .with_label_values(&[cluster, kind])
            .inc();
    }

    /// Helper to set a labeled gauge
    pub fn set_gauge(&self, gauge: &GaugeVec, labels: &[&str], value: f64) {
        gauge.with_label_values(labels).set(value);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Clear every Ceph series; `up` and the failure counter are kept
    pub fn reset(&self) {
        *self.published.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.pg_state_count.reset();
        self.osd_kb_used.reset();
        self.osd_kb_total.reset();
        self.osd_snap_trim_queue_len.reset();
        self.osd_num_snap_trimming.reset();
        self.osd_apply_latency_ms.reset();
        self.osd_commit_latency_ms.reset();
        self.cluster_read_bytes_sec.reset();
        self.cluster_write_bytes_sec.reset();
        self.cluster_op_per_sec.reset();
        self.cluster_recovering_objects.reset();
        self.cluster_recovering_bytes.reset();
        self.cluster_slow_requests.reset();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics collector")
    }
}
