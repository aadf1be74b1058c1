//! Property-based tests using proptest
//!
//! Tests that verify flattening properties hold for arbitrary documents.

use ceph_pg_exporter::ceph::types::{
    CephStatus, FsPerfStat, Health, HealthSummary, OsdStat, PgDump, PgMap, PgStat,
};
use ceph_pg_exporter::collectors::flatten;
use ceph_pg_exporter::flat::{Category, MetricValue};
use ceph_pg_exporter::metrics::MetricsCollector;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn quiet_status() -> CephStatus {
    CephStatus {
        pgmap: PgMap {
            read_bytes_sec: 0.0,
            write_bytes_sec: 0.0,
            op_per_sec: 0.0,
            recovering_objects_per_sec: None,
            recovering_bytes_per_sec: None,
        },
        health: Health { summary: None },
    }
}

fn osd(id: u32) -> OsdStat {
    OsdStat {
        osd: id,
        kb_used: 10,
        kb: 100,
        snap_trim_queue_len: 0,
        num_snap_trimming: 0,
        fs_perf_stat: FsPerfStat {
            apply_latency_ms: 1.0,
            commit_latency_ms: 2.0,
        },
    }
}

fn pg_label() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z_]{0,12}", 1..5).prop_map(|tokens| tokens.join("+"))
}

proptest! {
    #[test]
    fn test_pg_counts_sum_to_token_total(labels in prop::collection::vec(pg_label(), 0..50)) {
        // Given: Arbitrary PG labels
        let dump = PgDump {
            pg_stats: labels.iter().map(|l| PgStat { state: l.clone() }).collect(),
            osd_stats: vec![],
        };
        let expected: usize = labels.iter().map(|l| l.split('+').count()).sum();

        // When: Flattening
        let set = flatten("ceph", "main", &dump, &quiet_status()).unwrap();

        // Then: State counts add up to the number of tokens
        let total: i64 = set
            .category(Category::Pg)
            .map(|(_, value)| match value {
                MetricValue::Integer(count) => count,
                MetricValue::Float(_) => panic!("PG counts must be integers"),
            })
            .sum();
        prop_assert_eq!(total as usize, expected);
    }

    #[test]
    fn test_each_osd_produces_six_fields(ids in prop::collection::btree_set(0u32..500, 0..20)) {
        // Given: A dump reporting a set of OSDs
        let dump = PgDump {
            pg_stats: vec![],
            osd_stats: ids.iter().copied().map(osd).collect(),
        };

        let set = flatten("ceph", "main", &dump, &quiet_status()).unwrap();

        // Then: Exactly six fields per reported OSD and nothing for others
        for id in &ids {
            prop_assert_eq!(set.category(Category::Osd(*id)).count(), 6);
        }
        let reported: BTreeSet<u32> = set
            .iter()
            .filter_map(|(key, _)| match key.category {
                Category::Osd(id) => Some(id),
                _ => None,
            })
            .collect();
        prop_assert_eq!(reported, ids);
    }

    #[test]
    fn test_blocked_requests_count_round_trips(count in 0u64..1_000_000) {
        let mut status = quiet_status();
        status.health.summary = Some(vec![HealthSummary {
            summary: format!("{} requests are blocked > 32 sec", count),
        }]);
        let dump = PgDump { pg_stats: vec![], osd_stats: vec![] };

        let set = flatten("ceph", "main", &dump, &status).unwrap();

        prop_assert_eq!(
            set.get(Category::Cluster, "slow_requests"),
            Some(MetricValue::Integer(count as i64))
        );
    }

    #[test]
    fn test_recovery_fields_present_iff_reported(recovering in any::<bool>()) {
        let mut status = quiet_status();
        if recovering {
            status.pgmap.recovering_objects_per_sec = Some(3.0);
            status.pgmap.recovering_bytes_per_sec = Some(4.0);
        }
        let dump = PgDump { pg_stats: vec![], osd_stats: vec![] };

        let set = flatten("ceph", "main", &dump, &status).unwrap();

        prop_assert_eq!(set.get(Category::Cluster, "recovering_objects").is_some(), recovering);
        prop_assert_eq!(set.get(Category::Cluster, "recovering_bytes").is_some(), recovering);
        prop_assert_eq!(set.category(Category::Cluster).count(), if recovering { 5 } else { 3 });
    }

    #[test]
    fn test_any_pg_state_renders_without_panic(state in "\\PC*") {
        // Given: A metrics collector and an arbitrary state token
        let metrics = MetricsCollector::new().expect("Failed to create metrics");
        let dump = PgDump {
            pg_stats: vec![PgStat { state }],
            osd_stats: vec![],
        };
        let set = flatten("ceph", "main", &dump, &quiet_status()).unwrap();

        // When: Publishing and rendering
        metrics.publish(&set);

        // Then: Rendering should not panic
        prop_assert!(metrics.render().is_ok());
    }
}
