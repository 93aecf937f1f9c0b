//! Strict priority scheduling with FIFO tie-break.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{check_level, Scheduler};
use crate::core::error::PoolError;
use crate::core::job::BoxedJob;

/// Heap entry ordered so that `BinaryHeap` (a max-heap) pops the lowest
/// `(key, seq)` first.
struct Entry<C> {
    key: u32,
    seq: u64,
    job: BoxedJob<C>,
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl<C> Eq for Entry<C> {}

impl<C> PartialOrd for Entry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Entry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower key wins; earlier arrival wins within a key.
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap over `levels` integer priorities; `0` is the most urgent.
pub struct PriorityScheduler<C> {
    levels: u32,
    next_seq: u64,
    heap: BinaryHeap<Entry<C>>,
}

impl<C> PriorityScheduler<C> {
    /// Create a scheduler accepting keys in `0..levels`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] when `levels` is zero.
    pub fn new(levels: u32) -> Result<Self, PoolError> {
        if levels == 0 {
            return Err(PoolError::InvalidConfig(
                "priority levels must be greater than 0".into(),
            ));
        }
        Ok(Self {
            levels,
            next_seq: 0,
            heap: BinaryHeap::new(),
        })
    }

    /// Number of priority levels.
    #[must_use]
    pub const fn levels(&self) -> u32 {
        self.levels
    }
}

impl<C: 'static> Scheduler<C> for PriorityScheduler<C> {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn check_priority(&self, priority: u32) -> Result<(), PoolError> {
        check_level(priority, self.levels)
    }

    fn insert(&mut self, job: BoxedJob<C>) {
        let key = job.priority();
        debug_assert!(key < self.levels, "priority {key} escaped admission check");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { key, seq, job });
    }

    fn next_job(&mut self) -> Option<BoxedJob<C>> {
        self.heap.pop().map(|entry| entry.job)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
