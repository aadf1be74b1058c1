use ceph_pg_exporter::flat::{Category, FlatMetricSet};
use ceph_pg_exporter::metrics::MetricsCollector;

fn sample_set() -> FlatMetricSet {
    let mut set = FlatMetricSet::new("ceph", "main");
    set.increment(Category::Pg, "active");
    set.increment(Category::Pg, "clean");
    set.set(Category::Osd(3), "kb_used", 2048u64);
    set.set(Category::Osd(3), "apply_latency_ms", 4.5);
    set.set(Category::Cluster, "op_per_sec", 120.0);
    set.set(Category::Cluster, "slow_requests", 7u64);
    set
}

#[test]
fn test_metrics_registration() {
    // Verify that all metrics can be created and registered without panicking
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    // Scalar metrics like ceph_up always appear; vectors only once set
    let output = metrics.render().expect("Failed to render metrics");
    assert!(output.contains("ceph_up"), "Missing ceph_up metric");
    assert!(!output.contains("ceph_pg_state_count{"));
}

#[test]
fn test_publish_maps_categories_to_series() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    metrics.publish(&sample_set());

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("ceph_pg_state_count{cluster=\"main\",state=\"active\"} 1"));
    assert!(rendered.contains("ceph_osd_kb_used{cluster=\"main\",osd=\"3\"} 2048"));
    assert!(rendered.contains("ceph_osd_apply_latency_ms{cluster=\"main\",osd=\"3\"} 4.5"));
    assert!(rendered.contains("ceph_cluster_op_per_sec{cluster=\"main\"} 120"));
    assert!(rendered.contains("ceph_cluster_slow_requests{cluster=\"main\"} 7"));
}

#[test]
fn test_publish_drops_series_missing_from_new_set() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");
    metrics.publish(&sample_set());

    // Next cycle: OSD 3 and slow requests are gone
    let mut next = FlatMetricSet::new("ceph", "main");
    next.increment(Category::Pg, "active");
    next.set(Category::Cluster, "op_per_sec", 1.0);
    metrics.publish(&next);

    let rendered = metrics.render().unwrap();
    assert!(!rendered.contains("osd=\"3\""));
    assert!(!rendered.contains("ceph_cluster_slow_requests{"));
    assert!(!rendered.contains("state=\"clean\""));
}

#[test]
fn test_record_failure_counts_by_kind() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    metrics.record_failure("main", "invocation");
    metrics.record_failure("main", "invocation");
    metrics.record_failure("main", "parse");

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains(
        "ceph_collection_failures_total{cluster=\"main\",kind=\"invocation\"} 2"
    ));
    assert!(rendered.contains("ceph_collection_failures_total{cluster=\"main\",kind=\"parse\"} 1"));
}

#[test]
fn test_publish_updates_shared_series_in_place() {
    // Given: A series exported by the previous cycle
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");
    metrics.publish(&sample_set());
    let active = metrics
        .pg_state_count
        .with_label_values(&["main", "active"]);

    // When: The next cycle reports the same state with a new count
    let mut next = FlatMetricSet::new("ceph", "main");
    for _ in 0..5 {
        next.increment(Category::Pg, "active");
    }
    metrics.publish(&next);

    // Then: The existing series was updated rather than dropped and recreated
    assert_eq!(active.get(), 5.0);
    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("ceph_pg_state_count{cluster=\"main\",state=\"active\"} 5"));
}

#[test]
fn test_publish_for_renamed_cluster_drops_old_cluster_series() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");
    metrics.publish(&sample_set());

    let mut next = FlatMetricSet::new("ceph", "backup");
    next.increment(Category::Pg, "active");
    metrics.publish(&next);

    let rendered = metrics.render().unwrap();
    assert!(!rendered.contains("cluster=\"main\""));
    assert!(rendered.contains("ceph_pg_state_count{cluster=\"backup\",state=\"active\"} 1"));
}
