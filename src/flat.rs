//! Flat Metric Set
//!
//! The output of one collection cycle: a mapping from
//! `(category, field)` to a numeric value, scoped to one cluster.
//!
//! Rendered names follow the dotted layout used by collectd/Graphite sinks:
//!
//! ```text
//! ceph-<cluster>.pg.active+clean 12
//! ceph-<cluster>.osd-3.apply_latency_ms 4
//! ceph-<cluster>.cluster.slow_requests 137
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Group a flat metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Placement group state counts, one field per state token
    Pg,
    /// Per-OSD capacity and performance figures
    Osd(u32),
    /// Cluster-wide throughput and health figures
    Cluster,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Pg => f.write_str("pg"),
            Category::Osd(id) => write!(f, "osd-{}", id),
            Category::Cluster => f.write_str("cluster"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub category: Category,
    pub field: String,
}

impl MetricKey {
    pub fn new(category: Category, field: impl Into<String>) -> Self {
        Self {
            category,
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Integer(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Metrics produced by one collection cycle for one cluster
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMetricSet {
    cluster: String,
    namespace: String,
    values: BTreeMap<MetricKey, MetricValue>,
}

impl FlatMetricSet {
    /// Create an empty set namespaced as `<prefix>-<cluster>`
    pub fn new(prefix: &str, cluster: &str) -> Self {
        Self {
            cluster: cluster.to_string(),
            namespace: format!("{}-{}", prefix, cluster),
            values: BTreeMap::new(),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, category: Category, field: &str, value: impl Into<MetricValue>) {
        self.values
            .insert(MetricKey::new(category, field), value.into());
    }

    /// Add one to an integer field, starting from zero when absent
    pub fn increment(&mut self, category: Category, field: &str) {
        let entry = self
            .values
            .entry(MetricKey::new(category, field))
            .or_insert(MetricValue::Integer(0));
        if let MetricValue::Integer(count) = entry {
            *count += 1;
        }
    }

    pub fn get(&self, category: Category, field: &str) -> Option<MetricValue> {
        self.values.get(&MetricKey::new(category, field)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &MetricValue)> {
        self.values.iter()
    }

    /// Fields of one category, in field order
    pub fn category(&self, category: Category) -> impl Iterator<Item = (&str, MetricValue)> {
        self.values
            .iter()
            .filter(move |(key, _)| key.category == category)
            .map(|(key, value)| (key.field.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Full dotted name of a key, e.g. `ceph-main.osd-3.kb_used`
    pub fn metric_name(&self, key: &MetricKey) -> String {
        format!("{}.{}.{}", self.namespace, key.category, key.field)
    }
}

/// One `name value` line per metric
impl fmt::Display for FlatMetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            writeln!(f, "{} {}", self.metric_name(key), value)?;
        }
        Ok(())
    }
}
