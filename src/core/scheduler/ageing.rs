//! Priority scheduling with completion-driven rank ageing.
//!
//! Every pending entry carries a real-valued rank that starts at its integer
//! priority key. Each retrieval advances a `tasks_finished` tick; whenever the
//! tick is a multiple of the ageing frequency, every pending rank is
//! recomputed as
//!
//! ```text
//! age      = tasks_finished - birth_tick
//! new_rank = min(levels - 1, old_rank + log10(age))
//! ```
//!
//! An entry aged in the very tick it was inserted (`age == 0`) is left alone:
//! `log10(0)` would otherwise turn its rank into `-inf`.
//!
//! Ranks are bounded by `levels - 1` and never drop below the original key.
//! Once several entries share the ceiling they are served in arrival order.
//! Each ageing pass rebuilds the heap, so it costs O(pending); keep the
//! frequency high relative to the expected queue depth.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::trace;

use super::{check_level, Scheduler};
use crate::core::error::PoolError;
use crate::core::job::BoxedJob;

struct Entry<C> {
    rank: f64,
    seq: u64,
    key: u32,
    birth_tick: u64,
    job: BoxedJob<C>,
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
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
        // Reversed for the max-heap: lowest rank, then earliest arrival.
        other
            .rank
            .total_cmp(&self.rank)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Snapshot of one pending entry's ageing state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingRank {
    /// Arrival sequence number (0 for the first insertion).
    pub seq: u64,
    /// Priority key the job was submitted with.
    pub key: u32,
    /// Current effective rank.
    pub rank: f64,
    /// Value of `tasks_finished` when the job was inserted.
    pub birth_tick: u64,
}

/// Min-heap over real-valued ranks that are periodically aged.
pub struct AgeingPriorityScheduler<C> {
    levels: u32,
    frequency: u64,
    tasks_finished: u64,
    next_seq: u64,
    heap: BinaryHeap<Entry<C>>,
}

impl<C> AgeingPriorityScheduler<C> {
    /// Create a scheduler with `levels` priorities that ages pending ranks
    /// every `frequency` retrievals.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] when `levels` or `frequency` is zero.
    pub fn new(levels: u32, frequency: u64) -> Result<Self, PoolError> {
        if levels == 0 {
            return Err(PoolError::InvalidConfig(
                "priority levels must be greater than 0".into(),
            ));
        }
        if frequency == 0 {
            return Err(PoolError::InvalidConfig(
                "ageing frequency must be at least 1".into(),
            ));
        }
        Ok(Self {
            levels,
            frequency,
            tasks_finished: 0,
            next_seq: 0,
            heap: BinaryHeap::new(),
        })
    }

    /// Number of priority levels.
    #[must_use]
    pub const fn levels(&self) -> u32 {
        self.levels
    }

    /// Retrievals between two ageing passes.
    #[must_use]
    pub const fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Retrievals performed so far.
    #[must_use]
    pub const fn tasks_finished(&self) -> u64 {
        self.tasks_finished
    }

    /// Ageing state of every pending entry, in arrival order.
    #[must_use]
    pub fn pending_ranks(&self) -> Vec<PendingRank> {
        let mut ranks: Vec<PendingRank> = self
            .heap
            .iter()
            .map(|e| PendingRank {
                seq: e.seq,
                key: e.key,
                rank: e.rank,
                birth_tick: e.birth_tick,
            })
            .collect();
        ranks.sort_by_key(|r| r.seq);
        ranks
    }

    /// Recompute every pending rank and restore the heap.
    fn age_pending(&mut self) {
        let ceiling = f64::from(self.levels - 1);
        let now = self.tasks_finished;
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        for entry in &mut entries {
            let age = now.saturating_sub(entry.birth_tick);
            if age == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let boost = (age as f64).log10();
            entry.rank = (entry.rank + boost).min(ceiling);
        }
        self.heap = BinaryHeap::from(entries);
        trace!(tick = now, pending = self.heap.len(), "aged pending ranks");
    }
}

impl<C: 'static> Scheduler<C> for AgeingPriorityScheduler<C> {
    fn name(&self) -> &'static str {
        "ageing"
    }

    fn check_priority(&self, priority: u32) -> Result<(), PoolError> {
        check_level(priority, self.levels)
    }

    fn insert(&mut self, job: BoxedJob<C>) {
        let key = job.priority();
        debug_assert!(key < self.levels, "priority {key} escaped admission check");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            rank: f64::from(key),
            seq,
            key,
            birth_tick: self.tasks_finished,
            job,
        });
    }

    fn next_job(&mut self) -> Option<BoxedJob<C>> {
        let entry = self.heap.pop()?;
        self.tasks_finished += 1;
        if self.tasks_finished % self.frequency == 0 {
            self.age_pending();
        }
        Some(entry.job)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    /// Takes the heap as-is: drained jobs never ran, so the tick stays put
    /// and no ageing pass is triggered.
    fn drain(&mut self) -> Vec<BoxedJob<C>> {
        std::mem::take(&mut self.heap)
            .into_sorted_vec()
            .into_iter()
            .rev()
            .map(|entry| entry.job)
            .collect()
    }
}
