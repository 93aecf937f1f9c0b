//! Tests for configuration validation

use prometheus_conpool::config::{PoolConfig, ReconnectConfig, SchedulerConfig};
use prometheus_conpool::core::Credentials;
use std::time::Duration;

#[test]
fn test_pool_config_validation() {
    let valid = PoolConfig::new()
        .with_worker_count(4)
        .with_queue_capacity(16)
        .with_scheduler(SchedulerConfig::Priority { levels: 3 });
    assert!(valid.validate().is_ok());
}

#[test]
fn test_pool_config_invalid_worker_count() {
    let invalid = PoolConfig::new().with_worker_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_queue_capacity() {
    let invalid = PoolConfig::new().with_queue_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_levels() {
    let invalid = PoolConfig::new().with_scheduler(SchedulerConfig::Priority { levels: 0 });
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("scheduler invalid"), "{err}");
}

#[test]
fn test_pool_config_empty_address() {
    let invalid = PoolConfig::new().with_endpoint(Credentials::new("", "root", ""));
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_from_json() {
    let json = r#"{
        "worker_count": 8,
        "queue_capacity": 256,
        "endpoint": { "address": "tcp://db:3306", "user": "app", "password": "secret" },
        "scheduler": { "kind": "ageing", "levels": 4, "frequency": 10 },
        "reconnect": { "max_attempts": 5 }
    }"#;

    let cfg = PoolConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.worker_count, 8);
    assert_eq!(cfg.queue_capacity, 256);
    assert_eq!(cfg.endpoint.user, "app");
    assert_eq!(
        cfg.scheduler,
        SchedulerConfig::Ageing {
            levels: 4,
            frequency: 10
        }
    );
    assert_eq!(cfg.reconnect.max_attempts, 5);
    assert_eq!(cfg.reconnect.initial_backoff_ms, 100);
    assert_eq!(cfg.thread_name_prefix, "conpool-worker");
}

#[test]
fn test_pool_config_from_json_defaults() {
    let cfg = PoolConfig::from_json_str("{}").unwrap();
    assert!(cfg.worker_count >= 1);
    assert_eq!(cfg.queue_capacity, 1024);
    assert_eq!(cfg.scheduler, SchedulerConfig::Fcfs);
    assert_eq!(cfg.endpoint.address, "tcp://127.0.0.1:3306");
}

#[test]
fn test_pool_config_from_json_rejects_invalid() {
    assert!(PoolConfig::from_json_str(r#"{"queue_capacity": 0}"#).is_err());
    assert!(PoolConfig::from_json_str(r#"{"scheduler": {"kind": "lottery"}}"#).is_err());
    assert!(PoolConfig::from_json_str("not json").is_err());
}

#[test]
fn test_pool_config_debug_hides_password() {
    let cfg = PoolConfig::new().with_endpoint(Credentials::new("tcp://db:3306", "app", "hunter2"));
    assert!(!format!("{cfg:?}").contains("hunter2"));
}

#[test]
fn test_pool_config_from_env() {
    std::env::set_var("CONPOOL_WORKERS", "3");
    std::env::set_var("CONPOOL_QUEUE_CAPACITY", "12");
    std::env::set_var("CONPOOL_USER", "envuser");
    std::env::set_var("CONPOOL_SCHEDULER", r#"{"kind": "priority", "levels": 5}"#);

    let cfg = PoolConfig::from_env().unwrap();
    assert_eq!(cfg.worker_count, 3);
    assert_eq!(cfg.queue_capacity, 12);
    assert_eq!(cfg.endpoint.user, "envuser");
    assert_eq!(cfg.scheduler, SchedulerConfig::Priority { levels: 5 });

    std::env::set_var("CONPOOL_WORKERS", "many");
    assert!(PoolConfig::from_env().is_err());

    for key in [
        "CONPOOL_WORKERS",
        "CONPOOL_QUEUE_CAPACITY",
        "CONPOOL_USER",
        "CONPOOL_SCHEDULER",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_reconnect_backoff() {
    let policy = ReconnectConfig::default();
    assert_eq!(policy.backoff(0), Duration::from_millis(100));
    assert_eq!(policy.backoff(2), Duration::from_millis(400));
    assert_eq!(policy.backoff(10), Duration::from_millis(5_000));
    assert_eq!(ReconnectConfig::disabled().max_attempts, 0);
}
