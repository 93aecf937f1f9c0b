//! Configuration models for pools, schedulers and reconnect policy.

pub mod pool;

pub use pool::{PoolConfig, ReconnectConfig, SchedulerConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_STACK_SIZE};
