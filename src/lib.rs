//! # Prometheus Conpool
//!
//! A bounded, multi-worker execution pool that runs jobs against long-lived
//! resource handles such as database connections.
//!
//! Each of the pool's `N` worker threads opens one connection when it starts
//! and keeps it for its whole life. Producers submit jobs into a queue of fixed
//! capacity `Q` and block while it is full. A pluggable scheduler decides which
//! pending job an idle worker picks up next.
//!
//! ## Key Features
//!
//! - **Bounded admission**: two counting semaphores ("empty slots" and "full
//!   slots") keep the number of pending jobs within `Q`
//! - **Pluggable ordering**: first-come-first-served, strict priority, and
//!   priority with completion-driven ageing
//! - **One connection per worker**: connection setup is serialized; a failed
//!   job tears its connection down and the worker reconnects with backoff
//! - **Drain-to-completion shutdown**: `stop()` rejects new work, lets workers
//!   finish the backlog and joins them
//! - **Async bridge**: `submit_async`/`stop_async` for tokio callers
//!
//! ## Example
//!
//! ```rust
//! use prometheus_conpool::builders::build_pool;
//! use prometheus_conpool::config::{PoolConfig, SchedulerConfig};
//! use prometheus_conpool::infra::{InsertRow, MemoryConnector, MemoryDatabase};
//!
//! let db = MemoryDatabase::new();
//! let config = PoolConfig::new()
//!     .with_worker_count(4)
//!     .with_queue_capacity(64)
//!     .with_scheduler(SchedulerConfig::Priority { levels: 3 });
//!
//! let pool = build_pool(config, MemoryConnector::new(db.clone()))?;
//! pool.start()?;
//! for age in 0..10 {
//!     pool.submit(InsertRow::new("mytable", "bob", age).with_priority(2))?;
//! }
//! pool.stop()?;
//!
//! assert_eq!(db.row_count("mytable"), 10);
//! # Ok::<(), prometheus_conpool::core::PoolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Pool, scheduling disciplines, jobs and the resource-handle boundary.
pub mod core;
/// Configuration models for pools, schedulers and reconnect policy.
pub mod config;
/// Builders to construct schedulers and pools from configuration.
pub mod builders;
/// In-memory resource adapters used by tests, benches and docs.
pub mod infra;
/// Async runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;

/// Mutex primitive (parking_lot).
pub mod mutex;
/// Condition variable primitive (parking_lot).
pub mod condvar;
/// Counting semaphore with shutdown interrupt.
pub mod semaphore;

pub use condvar::Condvar;
pub use mutex::{Mutex, MutexGuard};
pub use semaphore::{Acquire, CountingSemaphore};
