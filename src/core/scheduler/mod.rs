//! Scheduling disciplines and the admission protocol that binds them to a pool.
//!
//! A [`Scheduler`] owns the backing store of pending jobs and decides the
//! retrieval order. It never blocks and never locks: the pool wraps it in a
//! [`BoundScheduler`], which holds the queue mutex and the two admission
//! semaphores and runs the same bounded-admission protocol for every
//! discipline.
//!
//! | Scheduler | Store | Order |
//! |-----------|-------|-------|
//! | [`FcfsScheduler`] | `VecDeque` | arrival |
//! | [`PriorityScheduler`] | min-heap | `(key, arrival)` |
//! | [`AgeingPriorityScheduler`] | min-heap | `(rank, arrival)`, rank recomputed on completions |

pub mod ageing;
pub mod bound;
pub mod fcfs;
pub mod priority;

pub use ageing::{AgeingPriorityScheduler, PendingRank};
pub use bound::{BoundScheduler, PoolState};
pub use fcfs::FcfsScheduler;
pub use priority::PriorityScheduler;

use super::error::PoolError;
use super::job::BoxedJob;

/// Ordering policy over a backing store of pending jobs.
///
/// All methods are called with the pool's queue mutex held.
pub trait Scheduler<C>: Send {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Reject a priority key this scheduler cannot order.
    ///
    /// Called before a submission consumes a queue slot.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PriorityOutOfRange`] for out-of-range keys.
    fn check_priority(&self, _priority: u32) -> Result<(), PoolError> {
        Ok(())
    }

    /// Add a job to the backing store.
    fn insert(&mut self, job: BoxedJob<C>);

    /// Remove the most eligible job, or `None` when the store is empty.
    fn next_job(&mut self) -> Option<BoxedJob<C>>;

    /// Number of pending jobs.
    fn len(&self) -> usize;

    /// Whether no job is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every pending job in retrieval order.
    fn drain(&mut self) -> Vec<BoxedJob<C>> {
        let mut jobs = Vec::with_capacity(self.len());
        while let Some(job) = self.next_job() {
            jobs.push(job);
        }
        jobs
    }
}

impl<C> Scheduler<C> for Box<dyn Scheduler<C>> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn check_priority(&self, priority: u32) -> Result<(), PoolError> {
        (**self).check_priority(priority)
    }

    fn insert(&mut self, job: BoxedJob<C>) {
        (**self).insert(job);
    }

    fn next_job(&mut self) -> Option<BoxedJob<C>> {
        (**self).next_job()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn drain(&mut self) -> Vec<BoxedJob<C>> {
        (**self).drain()
    }
}

/// Shared validation for level-based schedulers.
fn check_level(priority: u32, levels: u32) -> Result<(), PoolError> {
    if priority >= levels {
        return Err(PoolError::PriorityOutOfRange { priority, levels });
    }
    Ok(())
}
