//! Configuration validation tests
//!
//! Tests that verify configuration defaults and the checks applied after
//! CLI overrides.

use ceph_pg_exporter::config::{CephConfig, Config, MetricsConfig, ServerConfig};
use std::time::Duration;

#[test]
fn test_defaults_are_valid() {
    // Given: A configuration built entirely from defaults
    let config = Config::default();

    // Then: It targets the default cluster and passes validation
    assert_eq!(config.ceph.cluster, "ceph");
    assert_eq!(config.ceph.binary, "ceph");
    assert_eq!(config.server.port, 9128);
    assert_eq!(config.metrics.prefix, "ceph");
    assert!(config.validate().is_ok());
}

#[test]
fn test_command_timeout_zero_disables_limit() {
    let mut ceph = CephConfig::default();
    assert_eq!(ceph.command_timeout(), Some(Duration::from_secs(30)));

    ceph.command_timeout_seconds = 0;
    assert_eq!(ceph.command_timeout(), None);
}

#[test]
fn test_cluster_names_are_validated() {
    for name in ["ceph", "backup-2", "site_a.prod"] {
        let mut config = Config::default();
        config.ceph.cluster = name.to_string();
        assert!(config.validate().is_ok(), "{} should be accepted", name);
    }

    for name in ["", "-leading-dash", "two words", "x;rm -rf /", "a/b"] {
        let mut config = Config::default();
        config.ceph.cluster = name.to_string();
        let err = config.validate().expect_err("name should be rejected");
        assert_eq!(err.kind(), "config");
    }
}

#[test]
fn test_zero_interval_is_rejected() {
    let config = Config {
        metrics: MetricsConfig {
            scrape_interval_seconds: 0,
            prefix: "ceph".to_string(),
        },
        ..Config::default()
    };

    let err = config.validate().expect_err("interval should be rejected");
    assert!(err.to_string().contains("interval"));
}

#[test]
fn test_empty_binary_and_prefix_are_rejected() {
    let mut config = Config::default();
    config.ceph.binary = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.metrics.prefix = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_server_config_construction() {
    let config = ServerConfig {
        addr: "127.0.0.1".to_string(),
        port: 8080,
    };

    assert_eq!(config.addr, "127.0.0.1");
    assert_eq!(config.port, 8080);
}
