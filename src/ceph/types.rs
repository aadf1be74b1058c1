//! Ceph CLI Document Types
//!
//! Struct definitions for the JSON printed by the two admin commands the
//! exporter runs. Only the fields the collectors read are declared; serde
//! ignores the rest of the (large) documents.
//!
//! # Commands Covered
//!
//! - `ceph pg dump --format json` → [`PgDump`], [`PgStat`], [`OsdStat`]
//! - `ceph status --format json` → [`CephStatus`], [`PgMap`], [`Health`]

use serde::Deserialize;

/// Output of `ceph pg dump --format json`
#[derive(Debug, Deserialize, Clone)]
pub struct PgDump {
    pub pg_stats: Vec<PgStat>,
    pub osd_stats: Vec<OsdStat>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PgStat {
    /// Composite label such as `active+clean+scrubbing`
    pub state: String,
}

impl PgStat {
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.state.split('+')
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OsdStat {
    pub osd: u32,
    pub kb_used: u64,
    pub kb: u64,
    pub snap_trim_queue_len: u64,
    pub num_snap_trimming: u64,
    pub fs_perf_stat: FsPerfStat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FsPerfStat {
    pub apply_latency_ms: f64,
    pub commit_latency_ms: f64,
}

/// Output of `ceph status --format json`
#[derive(Debug, Deserialize, Clone)]
pub struct CephStatus {
    pub pgmap: PgMap,
    pub health: Health,
}

/// Client and recovery throughput from the status `pgmap` section
#[derive(Debug, Deserialize, Clone)]
pub struct PgMap {
    pub read_bytes_sec: f64,
    pub write_bytes_sec: f64,
    pub op_per_sec: f64,
    // Ceph omits both recovery rates while nothing is recovering
    #[serde(default)]
    pub recovering_objects_per_sec: Option<f64>,
    #[serde(default)]
    pub recovering_bytes_per_sec: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Health {
    #[serde(default)]
    pub summary: Option<Vec<HealthSummary>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthSummary {
    pub summary: String,
}
