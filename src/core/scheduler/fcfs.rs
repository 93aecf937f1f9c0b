//! First-come-first-served scheduling.

use std::collections::VecDeque;

use super::Scheduler;
use crate::core::job::BoxedJob;

/// FIFO queue; priority keys are ignored.
pub struct FcfsScheduler<C> {
    queue: VecDeque<BoxedJob<C>>,
}

impl<C> FcfsScheduler<C> {
    /// Create an empty FIFO scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<C> Default for FcfsScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Scheduler<C> for FcfsScheduler<C> {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn insert(&mut self, job: BoxedJob<C>) {
        self.queue.push_back(job);
    }

    fn next_job(&mut self) -> Option<BoxedJob<C>> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}
