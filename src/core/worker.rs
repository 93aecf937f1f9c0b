//! Per-thread worker loop.
//!
//! Each worker owns exactly one connection for its whole life:
//!
//! ```text
//! CONNECTING -> RUNNING <-> DRAINING-CHECK -> EXITED
//!                  |             ^
//!                  v             |
//!              RECOVERING -------+   (reconnect failed: EXITED)
//! ```
//!
//! The job runs outside the queue mutex, so `N` workers execute in parallel
//! while the retrieval order is still decided under the mutex.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::error::JobError;
use super::pool::Shared;
use super::scheduler::bound::Claim;
use super::scheduler::{PoolState, Scheduler};
use super::Connector;

/// Spawn worker `worker_id` as a named OS thread.
pub(crate) fn spawn_worker<K, S>(
    worker_id: usize,
    shared: Arc<Shared<K, S>>,
    name_prefix: &str,
    stack_size: usize,
) -> io::Result<JoinHandle<()>>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    thread::Builder::new()
        .name(format!("{name_prefix}-{worker_id}"))
        .stack_size(stack_size)
        .spawn(move || {
            let worker = Worker {
                id: worker_id,
                shared,
            };
            worker.run();
        })
}

struct Worker<K, S>
where
    K: Connector,
{
    id: usize,
    shared: Arc<Shared<K, S>>,
}

impl<K, S> Worker<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    fn run(&self) {
        debug!(pool = %self.shared.pool_id, worker_id = self.id, "worker thread started");

        let Some(mut conn) = self.connect(false) else {
            self.retire();
            return;
        };
        self.set_connected(true);

        loop {
            if self.should_exit() {
                self.shared.connector.disconnect(conn);
                debug!(pool = %self.shared.pool_id, worker_id = self.id, "worker drained, exiting");
                return;
            }

            let job = match self.shared.scheduler.claim() {
                Claim::Job(job) => job,
                Claim::Interrupted => continue,
            };

            let priority = job.priority();
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.run(&mut conn)))
                .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(&*payload))));
            self.shared.scheduler.release_slot();
            self.record_busy(started);

            match outcome {
                Ok(()) => {
                    self.shared.counters.completed.fetch_add(1, Ordering::Relaxed);
                    debug!(pool = %self.shared.pool_id, worker_id = self.id, priority, "job completed");
                }
                Err(err) => {
                    self.shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        pool = %self.shared.pool_id,
                        worker_id = self.id,
                        priority,
                        error = %err,
                        "job failed; discarding connection"
                    );
                    self.set_connected(false);
                    self.shared.connector.disconnect(conn);
                    match self.connect(true) {
                        Some(fresh) => {
                            conn = fresh;
                            self.set_connected(true);
                        }
                        None => {
                            self.retire();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Draining and more connected workers than pending jobs: this one leaves.
    ///
    /// Workers still connecting or recovering are not counted, since they may
    /// never get a connection. The decrement happens under the stop-mutex, so
    /// the connected workers that stay always cover the remaining backlog.
    fn should_exit(&self) -> bool {
        let mut lifecycle = self.shared.scheduler.lifecycle();
        if lifecycle.state != PoolState::Draining {
            return false;
        }
        if lifecycle.connected > self.shared.scheduler.size() {
            lifecycle.connected -= 1;
            lifecycle.active_workers = lifecycle.active_workers.saturating_sub(1);
            return true;
        }
        false
    }

    fn set_connected(&self, connected: bool) {
        let mut lifecycle = self.shared.scheduler.lifecycle();
        if connected {
            lifecycle.connected += 1;
        } else {
            lifecycle.connected = lifecycle.connected.saturating_sub(1);
        }
    }

    /// Open a connection under the connection-setup mutex, retrying with
    /// backoff. `None` once every attempt has failed.
    fn connect(&self, reconnecting: bool) -> Option<K::Connection> {
        let policy = self.shared.reconnect;
        let mut attempt = 0;
        loop {
            let result = {
                let _setup = self.shared.connect_lock.lock();
                self.shared.connector.connect(&self.shared.credentials)
            };
            match result {
                Ok(conn) => {
                    if reconnecting {
                        self.shared.counters.reconnects.fetch_add(1, Ordering::Relaxed);
                    }
                    info!(
                        pool = %self.shared.pool_id,
                        worker_id = self.id,
                        address = %self.shared.credentials.address,
                        attempt,
                        "connection established"
                    );
                    return Some(conn);
                }
                Err(err) if attempt < policy.max_attempts => {
                    let delay = policy.backoff(attempt);
                    warn!(
                        pool = %self.shared.pool_id,
                        worker_id = self.id,
                        error = %err,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "connect failed; retrying"
                    );
                    attempt += 1;
                    thread::sleep(delay);
                }
                Err(err) => {
                    error!(
                        pool = %self.shared.pool_id,
                        worker_id = self.id,
                        error = %err,
                        attempts = attempt + 1,
                        "connect failed; giving up"
                    );
                    return None;
                }
            }
        }
    }

    fn retire(&self) {
        let remaining = {
            let mut lifecycle = self.shared.scheduler.lifecycle();
            lifecycle.active_workers = lifecycle.active_workers.saturating_sub(1);
            lifecycle.active_workers
        };
        error!(
            pool = %self.shared.pool_id,
            worker_id = self.id,
            remaining,
            "worker retired without a connection"
        );
    }

    fn record_busy(&self, started: Instant) {
        let nanos = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.shared.counters.busy_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
