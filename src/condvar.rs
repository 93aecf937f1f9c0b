//! Condition variable used by the pool's blocking primitives.
//!
//! A thin wrapper over `parking_lot::Condvar` paired with the crate's
//! [`Mutex`](crate::Mutex). It backs [`CountingSemaphore`](crate::CountingSemaphore),
//! which is where waiting and waking actually happens in the pool.

use crate::MutexGuard;

/// A condition variable.
///
/// Unlike `std::sync::Condvar`, this type does not implement poisoning, so a
/// job that panics on a worker thread never leaves the pool's shared state
/// unusable.
///
/// # Examples
///
/// ```
/// use prometheus_conpool::{Condvar, Mutex};
/// use std::sync::Arc;
/// use std::thread;
///
/// let slots = Arc::new((Mutex::new(0usize), Condvar::new()));
/// let producer = Arc::clone(&slots);
///
/// thread::spawn(move || {
///     let (lock, cvar) = &*producer;
///     *lock.lock() += 1;
///     cvar.notify_one();
/// });
///
/// let (lock, cvar) = &*slots;
/// let mut free = lock.lock();
/// cvar.wait_while(&mut free, |free| *free == 0);
/// assert_eq!(*free, 1);
/// ```
#[derive(Debug, Default)]
pub struct Condvar {
    inner: parking_lot::Condvar,
}

impl Condvar {
    /// Creates a new condition variable.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: parking_lot::Condvar::new(),
        }
    }

    /// Blocks the current thread until this condition variable receives a notification.
    ///
    /// The mutex behind `guard` is released while blocked and re-acquired
    /// before returning. Callers must re-check their predicate in a loop.
    #[inline]
    pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) {
        self.inner.wait(guard);
    }

    /// Blocks the current thread while `condition` returns `true`.
    #[inline]
    pub fn wait_while<T, F>(&self, guard: &mut MutexGuard<'_, T>, condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        self.inner.wait_while(guard, condition);
    }

    /// Wakes up one blocked thread on this condvar.
    ///
    /// Calls to `notify_one` are not buffered in any way.
    #[inline]
    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    /// Wakes up all blocked threads on this condvar.
    #[inline]
    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}
