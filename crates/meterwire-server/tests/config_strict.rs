#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meterwire_core::error::MeterwireError;
use meterwire_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
metrics:
  common_tagz: { app: "sample" } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.runtime.worker_threads, None);
    assert_eq!(cfg.runtime.max_blocking_threads, 512);
    assert!(cfg.metrics.common_tags.is_empty());
    assert!(!cfg.metrics.latency_buckets.is_empty());
}

#[test]
fn full_config_round_trips_values() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9090"
runtime:
  worker_threads: 2
  max_blocking_threads: 16
metrics:
  prefix: "sample"
  common_tags:
    app: "meterwire"
    region: "local"
  latency_buckets: [0.01, 0.1, 1.0]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9090);
    assert_eq!(cfg.runtime.worker_threads, Some(2));
    assert_eq!(cfg.metrics.prefix.as_deref(), Some("sample"));
    assert_eq!(cfg.metrics.common_tags["region"], "local");
    assert_eq!(cfg.metrics.latency_buckets, vec![0.01, 0.1, 1.0]);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(matches!(err, MeterwireError::UnsupportedVersion));
}

#[test]
fn rejects_bad_listen_address() {
    let err = config::load_from_str("version: 1\nserver:\n  listen: \"nowhere\"\n").expect_err("must fail");
    assert!(matches!(err, MeterwireError::InvalidConfig(_)));
}

#[test]
fn rejects_unsorted_buckets() {
    let bad = "version: 1\nmetrics:\n  latency_buckets: [1.0, 0.5]\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn common_tags_cannot_shadow_request_labels() {
    for name in ["route", "exception", "method", "status", "outcome", "__x", "9lives"] {
        let bad = format!("version: 1\nmetrics:\n  common_tags:\n    \"{name}\": \"v\"\n");
        assert!(config::load_from_str(&bad).is_err(), "{name} must be rejected");
    }
}

#[test]
fn rejects_zero_workers() {
    let bad = "version: 1\nruntime:\n  worker_threads: 0\n";
    assert!(config::load_from_str(bad).is_err());
}
