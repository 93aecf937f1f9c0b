//! Tests for error types

use prometheus_conpool::core::{JobError, PoolError, ResourceError};

#[test]
fn test_shutting_down_error() {
    let err = PoolError::ShuttingDown;
    assert_eq!(format!("{}", err), "pool is shutting down; submission rejected");
}

#[test]
fn test_priority_out_of_range_error() {
    let err = PoolError::PriorityOutOfRange {
        priority: 7,
        levels: 4,
    };
    assert_eq!(format!("{}", err), "priority 7 out of range for 4 levels");
}

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("worker_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: worker_count must be greater than 0"
    );
}

#[test]
fn test_driver_error_carries_code_and_state() {
    let err = ResourceError::Driver {
        code: 1045,
        state: "28000".to_string(),
        message: "access denied".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "resource error 1045 (state 28000): access denied"
    );
}

#[test]
fn test_job_error_wraps_resource_error() {
    let err: JobError = ResourceError::Connect {
        address: "tcp://db:3306".to_string(),
        reason: "refused".to_string(),
    }
    .into();
    assert_eq!(format!("{}", err), "connection to tcp://db:3306 failed: refused");
}

#[test]
fn test_spawn_error_from_io() {
    let err: PoolError = std::io::Error::other("no threads left").into();
    assert!(matches!(err, PoolError::Spawn(_)));
    assert!(format!("{}", err).starts_with("failed to spawn worker thread"));
}
