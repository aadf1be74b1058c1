//! OSD Metrics Collector
//!
//! Collects capacity, snapshot trimming, and filestore latency figures for
//! every OSD reported by `pg dump`.
//!
//! # Metrics Produced
//! Under `<namespace>.osd-<id>`:
//! - `kb_used` - Used capacity in KiB
//! - `kb_total` - Total capacity in KiB
//! - `snap_trim_queue_len` - PGs queued for snapshot trimming
//! - `num_snap_trimming` - PGs currently trimming snapshots
//! - `apply_latency_ms` - Filestore apply latency
//! - `commit_latency_ms` - Filestore commit latency

use crate::ceph::types::{OsdStat, PgDump};
use crate::flat::{Category, FlatMetricSet};

/// Number of fields emitted per OSD
pub const OSD_FIELDS: usize = 6;

fn collect_osd_stats(osd: &OsdStat, set: &mut FlatMetricSet) {
    let category = Category::Osd(osd.osd);

    set.set(category, "kb_used", osd.kb_used);
    set.set(category, "kb_total", osd.kb);
    set.set(category, "snap_trim_queue_len", osd.snap_trim_queue_len);
    set.set(category, "num_snap_trimming", osd.num_snap_trimming);
    set.set(category, "apply_latency_ms", osd.fs_perf_stat.apply_latency_ms);
    set.set(category, "commit_latency_ms", osd.fs_perf_stat.commit_latency_ms);
}

/// Emits [`OSD_FIELDS`] fields for each OSD in the dump
pub fn collect_osd_metrics(dump: &PgDump, set: &mut FlatMetricSet) {
    for osd in &dump.osd_stats {
        collect_osd_stats(osd, set);
    }
}
