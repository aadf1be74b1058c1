//! Placement Group State Collector
//!
//! Counts placement groups per state token.
//!
//! # Metrics Produced
//! - `<namespace>.pg.<state>` - Number of PGs whose label contains `<state>`
//!
//! A label such as `active+clean` contributes one to `active` and one to
//! `clean`. Any token is accepted; there is no fixed list of states.

use crate::ceph::types::PgDump;
use crate::flat::{Category, FlatMetricSet};

/// Adds one `pg.<state>` count per `+`-delimited token of every PG label
pub fn collect_pg_metrics(dump: &PgDump, set: &mut FlatMetricSet) {
    for pg in &dump.pg_stats {
        for state in pg.states() {
            set.increment(Category::Pg, state);
        }
    }
}
