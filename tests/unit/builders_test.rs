//! Tests for builder modules

use prometheus_conpool::builders::{build_pool, build_scheduler, DynScheduler};
use prometheus_conpool::config::{PoolConfig, SchedulerConfig};
use prometheus_conpool::core::{FnJob, PoolError, PoolState, Scheduler};
use prometheus_conpool::infra::{MemoryConnector, MemoryDatabase};

type Trace = Vec<u32>;

fn scheduler(cfg: SchedulerConfig) -> DynScheduler<Trace> {
    build_scheduler(&cfg).unwrap()
}

#[test]
fn test_build_scheduler_names() {
    assert_eq!(scheduler(SchedulerConfig::Fcfs).name(), "fcfs");
    assert_eq!(
        scheduler(SchedulerConfig::Priority { levels: 2 }).name(),
        "priority"
    );
    assert_eq!(
        scheduler(SchedulerConfig::Ageing {
            levels: 2,
            frequency: 1
        })
        .name(),
        "ageing"
    );
}

#[test]
fn test_build_scheduler_checks_levels() {
    let boxed = scheduler(SchedulerConfig::Priority { levels: 2 });
    assert!(boxed.check_priority(1).is_ok());
    assert!(boxed.check_priority(2).is_err());

    // FCFS accepts any key.
    assert!(scheduler(SchedulerConfig::Fcfs).check_priority(u32::MAX).is_ok());
}

#[test]
fn test_build_scheduler_rejects_invalid() {
    let result = build_scheduler::<Trace>(&SchedulerConfig::Ageing {
        levels: 3,
        frequency: 0,
    });
    assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
}

#[test]
fn test_boxed_scheduler_orders_jobs() {
    let mut boxed = scheduler(SchedulerConfig::Priority { levels: 3 });
    for key in [2, 0, 1] {
        boxed.insert(Box::new(FnJob::with_priority(key, move |trace: &mut Trace| {
            trace.push(key);
            Ok(())
        })));
    }
    assert_eq!(boxed.len(), 3);

    let mut trace = Trace::new();
    for job in boxed.drain() {
        job.run(&mut trace).unwrap();
    }
    assert_eq!(trace, vec![0, 1, 2]);
    assert!(boxed.is_empty());
}

#[test]
fn test_build_pool_from_config() {
    let config = PoolConfig::new()
        .with_worker_count(3)
        .with_queue_capacity(5)
        .with_scheduler(SchedulerConfig::Priority { levels: 4 });
    let pool = build_pool(config, MemoryConnector::new(MemoryDatabase::new())).unwrap();

    assert_eq!(pool.worker_count(), 3);
    assert_eq!(pool.queue_capacity(), 5);
    assert_eq!(pool.state(), PoolState::Idle);
    assert!(pool.inspect_scheduler(|s| s.check_priority(3).is_ok()));
}

#[test]
fn test_build_pool_rejects_invalid_config() {
    let config = PoolConfig::new().with_worker_count(0);
    let result = build_pool(config, MemoryConnector::new(MemoryDatabase::new()));
    assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
}
