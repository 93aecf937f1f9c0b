//! Counting semaphore used for bounded admission.
//!
//! Every pool owns two of these: one counting free queue slots ("empty") and
//! one counting queued jobs ("full"). Producers wait on the first and signal
//! the second; workers do the reverse.
//!
//! Besides the classic `wait`/`signal` pair the semaphore can be
//! *interrupted*. Shutdown uses this to wake threads parked on a queue that
//! will never change again: a waiter that finds no permit after an interrupt
//! returns [`Acquire::Interrupted`] instead of sleeping. Available permits
//! always win over the interrupt, so queued work is still handed out while
//! the pool drains.

use crate::{Condvar, Mutex};

/// Outcome of [`CountingSemaphore::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A permit was taken.
    Acquired,
    /// No permit was available and the semaphore has been interrupted.
    Interrupted,
}

#[derive(Debug)]
struct State {
    count: usize,
    interrupted: bool,
}

/// Blocking counter built on [`Mutex`] and [`Condvar`].
///
/// There is no fairness guarantee beyond the condvar's wake order.
///
/// ```
/// use prometheus_conpool::{Acquire, CountingSemaphore};
///
/// let slots = CountingSemaphore::new(1);
/// assert_eq!(slots.wait(), Acquire::Acquired);
/// assert!(!slots.try_wait());
/// slots.signal();
/// assert_eq!(slots.available(), 1);
/// ```
#[derive(Debug)]
pub struct CountingSemaphore {
    state: Mutex<State>,
    cond: Condvar,
}

impl CountingSemaphore {
    /// Create a semaphore holding `permits` permits.
    #[must_use]
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(State {
                count: permits,
                interrupted: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Reset the count to `permits` and clear any interrupt.
    ///
    /// Must not race with [`wait`](Self::wait) or [`signal`](Self::signal);
    /// permits held by other threads are forgotten.
    pub fn init(&self, permits: usize) {
        let mut state = self.state.lock();
        state.count = permits;
        state.interrupted = false;
    }

    /// Block until a permit is available, then take it.
    ///
    /// Returns [`Acquire::Interrupted`] without taking anything when the
    /// count is zero and [`interrupt`](Self::interrupt) has been called.
    pub fn wait(&self) -> Acquire {
        let mut state = self.state.lock();
        self.cond
            .wait_while(&mut state, |s| s.count == 0 && !s.interrupted);
        if state.count == 0 {
            return Acquire::Interrupted;
        }
        state.count -= 1;
        Acquire::Acquired
    }

    /// Take a permit if one is available, without blocking.
    pub fn try_wait(&self) -> bool {
        let mut state = self.state.lock();
        if state.count == 0 {
            return false;
        }
        state.count -= 1;
        true
    }

    /// Return a permit and wake at most one waiter.
    pub fn signal(&self) {
        {
            let mut state = self.state.lock();
            state.count += 1;
        }
        self.cond.notify_one();
    }

    /// Wake every waiter; those finding no permit return `Interrupted`.
    ///
    /// The interrupt stays in effect until [`resume`](Self::resume).
    pub fn interrupt(&self) {
        {
            let mut state = self.state.lock();
            state.interrupted = true;
        }
        self.cond.notify_all();
    }

    /// Clear a previous interrupt; waiters block normally again.
    pub fn resume(&self) {
        self.state.lock().interrupted = false;
    }

    /// Number of permits currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.state.lock().count
    }

    /// Whether the semaphore is interrupted.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.state.lock().interrupted
    }
}

impl Default for CountingSemaphore {
    /// A binary semaphore holding one permit.
    fn default() -> Self {
        Self::new(1)
    }
}
