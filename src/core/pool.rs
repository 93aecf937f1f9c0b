//! Bounded multi-worker execution pool.
//!
//! A [`Pool`] owns `N` worker threads, each holding one live connection from
//! its [`Connector`], plus a [`BoundScheduler`] that decides which pending job
//! runs next. Producers block in [`Pool::submit`] while the queue is full.
//!
//! # Example
//!
//! ```rust
//! use prometheus_conpool::config::PoolConfig;
//! use prometheus_conpool::core::{FcfsScheduler, Pool};
//! use prometheus_conpool::infra::{InsertRow, MemoryConnector, MemoryDatabase};
//!
//! let db = MemoryDatabase::new();
//! let pool = Pool::new(
//!     PoolConfig::new().with_worker_count(2).with_queue_capacity(8),
//!     FcfsScheduler::new(),
//!     MemoryConnector::new(db.clone()),
//! )?;
//!
//! pool.start()?;
//! pool.submit(InsertRow::new("mytable", "alice", 30))?;
//! pool.stop()?;
//!
//! assert_eq!(db.row_count("mytable"), 1);
//! # Ok::<(), prometheus_conpool::core::PoolError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::connector::{Connector, Credentials};
use super::error::PoolError;
use super::job::{BoxedJob, Job};
use super::scheduler::{BoundScheduler, PoolState, Scheduler};
use super::worker::spawn_worker;
use crate::config::{PoolConfig, ReconnectConfig};
use crate::Mutex;

/// Point-in-time view of pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Configured number of worker threads.
    pub worker_count: usize,
    /// Workers that have not exited.
    pub active_workers: usize,
    /// Maximum number of pending jobs.
    pub queue_capacity: usize,
    /// Jobs waiting in the scheduler.
    pub pending: usize,
    /// Jobs accepted by `submit`.
    pub submitted: u64,
    /// Submissions refused (shutdown or out-of-range priority).
    pub rejected: u64,
    /// Jobs that ran to completion.
    pub completed: u64,
    /// Jobs that returned an error or panicked.
    pub failed: u64,
    /// Jobs dropped at `stop` because no worker was left to run them.
    pub discarded: u64,
    /// Successful reconnects after a failed job.
    pub reconnects: u64,
    /// Total time workers spent executing jobs.
    pub busy_time: Duration,
}

/// Lock-free counters behind [`PoolStats`].
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted: AtomicU64,
    pub rejected: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub discarded: AtomicU64,
    pub reconnects: AtomicU64,
    pub busy_nanos: AtomicU64,
}

impl PoolCounters {
    fn snapshot(&self) -> PoolStats {
        PoolStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            busy_time: Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed)),
            ..PoolStats::default()
        }
    }
}

/// State shared between the pool handle and its workers.
pub(crate) struct Shared<K, S>
where
    K: Connector,
{
    pub scheduler: BoundScheduler<K::Connection, S>,
    pub connector: K,
    /// Connection-setup mutex; connectors need not support concurrent connects.
    pub connect_lock: Mutex<()>,
    pub credentials: Credentials,
    pub reconnect: ReconnectConfig,
    pub counters: PoolCounters,
    pub pool_id: Uuid,
}

struct PoolInner<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    shared: Arc<Shared<K, S>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    config: PoolConfig,
}

/// Fixed-size worker pool dispatching jobs in scheduler order.
///
/// `Pool` is a cheap handle; clones share the same workers and queue.
pub struct Pool<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    inner: Arc<PoolInner<K, S>>,
}

impl<K, S> Clone for Pool<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, S> Pool<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    /// Create an idle pool. Workers are spawned by [`start`](Self::start).
    ///
    /// `config.scheduler` is not consulted here; the caller supplies the
    /// scheduler directly. See [`build_pool`](crate::builders::build_pool) to
    /// construct both from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: PoolConfig, scheduler: S, connector: K) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let cores = num_cpus::get();
        if config.worker_count > cores {
            warn!(
                worker_count = config.worker_count,
                cores, "number of workers exceeds CPU cores"
            );
        }

        let pool_id = Uuid::new_v4();
        let scheduler_name = scheduler.name();
        let shared = Arc::new(Shared {
            scheduler: BoundScheduler::bind(scheduler, config.queue_capacity)?,
            connector,
            connect_lock: Mutex::new(()),
            credentials: config.endpoint.clone(),
            reconnect: config.reconnect,
            counters: PoolCounters::default(),
            pool_id,
        });

        info!(
            pool = %pool_id,
            worker_count = config.worker_count,
            queue_capacity = config.queue_capacity,
            scheduler = scheduler_name,
            "pool created"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                shared,
                workers: Mutex::new(Vec::with_capacity(config.worker_count)),
                config,
            }),
        })
    }

    /// Submit a job, blocking while the queue is at capacity.
    ///
    /// Accepted while the pool is idle (the job waits for `start`) or running.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ShuttingDown`] once `stop` has been requested.
    /// - [`PoolError::PriorityOutOfRange`] if the scheduler cannot order the
    ///   job's priority.
    pub fn submit<J>(&self, job: J) -> Result<(), PoolError>
    where
        J: Job<K::Connection>,
    {
        self.submit_boxed(Box::new(job))
    }

    /// Submit an already boxed job. See [`submit`](Self::submit).
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    pub fn submit_boxed(&self, job: BoxedJob<K::Connection>) -> Result<(), PoolError> {
        let shared = &self.inner.shared;
        match shared.scheduler.submit(job) {
            Ok(()) => {
                shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) => {
                shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
                debug!(pool = %shared.pool_id, error = %err, "submission rejected");
                Err(err)
            }
        }
    }

    /// Spawn the worker threads.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadyRunning`] if the pool is running or draining.
    /// - [`PoolError::Spawn`] if a thread could not be created; workers
    ///   spawned before the failure keep running.
    pub fn start(&self) -> Result<(), PoolError> {
        let shared = &self.inner.shared;
        let config = &self.inner.config;
        let mut workers = self.inner.workers.lock();

        {
            let mut lifecycle = shared.scheduler.lifecycle();
            if matches!(lifecycle.state, PoolState::Running | PoolState::Draining) {
                return Err(PoolError::AlreadyRunning);
            }
            shared.scheduler.resume();
            lifecycle.state = PoolState::Running;
            lifecycle.active_workers = config.worker_count;
            lifecycle.connected = 0;
        }

        for worker_id in 0..config.worker_count {
            match spawn_worker(
                worker_id,
                Arc::clone(shared),
                &config.thread_name_prefix,
                config.thread_stack_size,
            ) {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    let missing = config.worker_count - worker_id;
                    {
                        let mut lifecycle = shared.scheduler.lifecycle();
                        lifecycle.active_workers = lifecycle.active_workers.saturating_sub(missing);
                    }
                    error!(pool = %shared.pool_id, worker_id, error = %err, "failed to spawn worker thread");
                    return Err(PoolError::Spawn(err));
                }
            }
        }

        info!(pool = %shared.pool_id, worker_count = config.worker_count, "pool started");
        Ok(())
    }

    /// Request shutdown, drain the backlog and join every worker.
    ///
    /// Submissions are rejected from the moment this is called. Jobs already
    /// queued still run unless every worker has retired, in which case they
    /// are discarded. The pool can be started again afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotRunning`] unless the pool is running.
    pub fn stop(&self) -> Result<(), PoolError> {
        let shared = &self.inner.shared;
        let mut workers = self.inner.workers.lock();

        {
            let mut lifecycle = shared.scheduler.lifecycle();
            if lifecycle.state != PoolState::Running {
                return Err(PoolError::NotRunning);
            }
            lifecycle.state = PoolState::Draining;
        }
        shared.scheduler.interrupt();
        info!(pool = %shared.pool_id, pending = shared.scheduler.size(), "pool draining");

        for (worker_id, handle) in workers.drain(..).enumerate() {
            if handle.join().is_err() {
                warn!(pool = %shared.pool_id, worker_id, "worker thread panicked");
            }
        }

        let discarded = shared.scheduler.discard_pending();
        if discarded > 0 {
            shared
                .counters
                .discarded
                .fetch_add(u64::try_from(discarded).unwrap_or(u64::MAX), Ordering::Relaxed);
            warn!(pool = %shared.pool_id, discarded, "no live worker left; discarded pending jobs");
        }

        {
            let mut lifecycle = shared.scheduler.lifecycle();
            if lifecycle.active_workers != 0 {
                warn!(
                    pool = %shared.pool_id,
                    active_workers = lifecycle.active_workers,
                    "workers exited without checking out"
                );
                lifecycle.active_workers = 0;
            }
            lifecycle.connected = 0;
            lifecycle.state = PoolState::Stopped;
        }

        info!(pool = %shared.pool_id, "pool stopped");
        Ok(())
    }

    /// Snapshot of counters and occupancy.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let shared = &self.inner.shared;
        let active_workers = shared.scheduler.lifecycle().active_workers;
        PoolStats {
            worker_count: self.inner.config.worker_count,
            active_workers,
            queue_capacity: shared.scheduler.capacity(),
            pending: shared.scheduler.size(),
            ..shared.counters.snapshot()
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PoolState {
        self.inner.shared.scheduler.state()
    }

    /// Identifier attached to every log line of this pool.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.shared.pool_id
    }

    /// Maximum number of pending jobs.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.inner.shared.scheduler.capacity()
    }

    /// Configured number of workers.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.inner.config.worker_count
    }

    /// Number of pending jobs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.shared.scheduler.size()
    }

    /// Run `f` against the scheduler under the queue mutex.
    pub fn inspect_scheduler<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.inner.shared.scheduler.inspect(f)
    }
}

impl<K, S> Drop for PoolInner<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    fn drop(&mut self) {
        // Request shutdown but don't join: workers drain and exit on their own.
        let was_running = {
            let mut lifecycle = self.shared.scheduler.lifecycle();
            let running = lifecycle.state == PoolState::Running;
            if running {
                lifecycle.state = PoolState::Draining;
            }
            running
        };
        if was_running {
            self.shared.scheduler.interrupt();
            debug!(pool = %self.shared.pool_id, "pool dropped while running; workers will drain and detach");
        }
    }
}
