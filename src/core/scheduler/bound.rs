//! A scheduler bound to a pool's admission state.
//!
//! [`BoundScheduler::bind`] wraps a [`Scheduler`] with everything the
//! bounded-admission protocol needs:
//!
//! - the queue mutex guarding the backing store,
//! - the "empty slots" semaphore (starts at the queue capacity),
//! - the "full slots" semaphore (starts at zero),
//! - the stop-mutex guarding the pool lifecycle and live worker count.
//!
//! Lock order, where both are held: stop-mutex, then queue mutex.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Scheduler;
use crate::core::error::PoolError;
use crate::core::job::BoxedJob;
use crate::{Acquire, CountingSemaphore, Mutex, MutexGuard};

/// Lifecycle of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Constructed, workers not started. Submissions queue up.
    Idle,
    /// Workers are running.
    Running,
    /// Shutdown requested; workers drain the backlog. Submissions are rejected.
    Draining,
    /// Every worker has exited. Submissions are rejected until `start`.
    Stopped,
}

impl PoolState {
    /// Whether new submissions are refused in this state.
    #[must_use]
    pub const fn rejects_submissions(self) -> bool {
        matches!(self, Self::Draining | Self::Stopped)
    }
}

/// State guarded by the stop-mutex.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    pub(crate) state: PoolState,
    /// Workers that have not exited yet.
    pub(crate) active_workers: usize,
    /// Workers currently holding a live connection. Only these can serve
    /// the backlog, so the drain check counts them and not `active_workers`.
    pub(crate) connected: usize,
}

/// Result of a worker's attempt to claim the next job.
pub(crate) enum Claim<C> {
    Job(BoxedJob<C>),
    /// Woken by shutdown with nothing to claim.
    Interrupted,
}

/// A [`Scheduler`] together with the queue mutex, admission semaphores and
/// lifecycle state of the pool that owns it.
pub struct BoundScheduler<C, S> {
    store: Mutex<S>,
    empty_slots: CountingSemaphore,
    full_slots: CountingSemaphore,
    lifecycle: Mutex<Lifecycle>,
    capacity: usize,
    _conn: PhantomData<fn(C)>,
}

impl<C, S> BoundScheduler<C, S>
where
    C: 'static,
    S: Scheduler<C>,
{
    /// Bind `scheduler` to fresh admission state with `capacity` queue slots.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] when `capacity` is zero.
    pub fn bind(scheduler: S, capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "queue_capacity must be greater than 0".into(),
            ));
        }
        Ok(Self {
            store: Mutex::new(scheduler),
            empty_slots: CountingSemaphore::new(capacity),
            full_slots: CountingSemaphore::new(0),
            lifecycle: Mutex::new(Lifecycle {
                state: PoolState::Idle,
                active_workers: 0,
                connected: 0,
            }),
            capacity,
            _conn: PhantomData,
        })
    }

    /// Admit `job`, blocking while the queue is at capacity.
    ///
    /// # Errors
    ///
    /// - [`PoolError::PriorityOutOfRange`] if the scheduler cannot order the
    ///   job's key; no slot is consumed.
    /// - [`PoolError::ShuttingDown`] if shutdown was requested before the job
    ///   was stored; no slot is consumed and nothing is queued.
    pub fn submit(&self, job: BoxedJob<C>) -> Result<(), PoolError> {
        let priority = job.priority();
        self.store.lock().check_priority(priority)?;

        if self.lifecycle.lock().state.rejects_submissions() {
            warn!(priority, "submission rejected: pool is shutting down");
            return Err(PoolError::ShuttingDown);
        }

        if self.empty_slots.wait() == Acquire::Interrupted {
            warn!(priority, "submission rejected: shutdown while waiting for a slot");
            return Err(PoolError::ShuttingDown);
        }

        // Shutdown may have started while this producer was parked on a
        // full queue; re-check with the slot in hand.
        let lifecycle = self.lifecycle.lock();
        if lifecycle.state.rejects_submissions() {
            drop(lifecycle);
            self.empty_slots.signal();
            warn!(priority, "submission rejected: shutdown while waiting for a slot");
            return Err(PoolError::ShuttingDown);
        }
        {
            let mut store = self.store.lock();
            store.insert(job);
            debug!(priority, pending = store.len(), scheduler = store.name(), "job admitted");
        }
        self.full_slots.signal();
        drop(lifecycle);
        Ok(())
    }

    /// Number of pending jobs.
    pub fn size(&self) -> usize {
        self.store.lock().len()
    }

    /// Queue capacity fixed at bind time.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.lifecycle.lock().state
    }

    /// Run `f` against the underlying scheduler under the queue mutex.
    pub fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let store = self.store.lock();
        f(&*store)
    }

    pub(crate) fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock()
    }

    /// Wait for a queued job and remove it under the queue mutex.
    pub(crate) fn claim(&self) -> Claim<C> {
        if self.full_slots.wait() == Acquire::Interrupted {
            return Claim::Interrupted;
        }
        let mut store = self.store.lock();
        match store.next_job() {
            Some(job) => Claim::Job(job),
            None => unreachable!("full-slot permit granted with an empty backing store"),
        }
    }

    /// Return the slot of a job that has left the backing store.
    pub(crate) fn release_slot(&self) {
        self.empty_slots.signal();
    }

    /// Wake every thread parked on either semaphore.
    pub(crate) fn interrupt(&self) {
        self.full_slots.interrupt();
        self.empty_slots.interrupt();
    }

    /// Undo [`interrupt`](Self::interrupt) before workers start again.
    pub(crate) fn resume(&self) {
        self.full_slots.resume();
        self.empty_slots.resume();
    }

    /// Remove every pending job and hand its slot back.
    ///
    /// Only called once no worker is left to claim them.
    pub(crate) fn discard_pending(&self) -> usize {
        let discarded = {
            let mut store = self.store.lock();
            let jobs = store.drain();
            for _ in &jobs {
                self.full_slots.try_wait();
            }
            jobs.len()
        };
        for _ in 0..discarded {
            self.empty_slots.signal();
        }
        discarded
    }
}
