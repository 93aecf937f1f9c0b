//! Job abstraction executed by pool workers.

use std::fmt;

use super::error::JobError;

/// A unit of work executed against one live resource handle.
///
/// Jobs are moved into the pool on submission and dropped by the worker once
/// they have run, so the caller never has to keep them alive. `C` is the
/// connection type produced by the pool's [`Connector`](crate::core::Connector).
///
/// # Example
///
/// ```rust
/// use prometheus_conpool::core::{Job, JobError};
/// use prometheus_conpool::infra::MemoryConnection;
///
/// struct Audit {
///     user: String,
/// }
///
/// impl Job<MemoryConnection> for Audit {
///     fn priority(&self) -> u32 {
///         1
///     }
///
///     fn run(self: Box<Self>, conn: &mut MemoryConnection) -> Result<(), JobError> {
///         conn.insert("audit", &self.user, 0)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Job<C>: Send + 'static {
    /// Priority key; lower is more urgent. Ignored by FCFS scheduling.
    fn priority(&self) -> u32 {
        0
    }

    /// Execute the job, consuming it.
    ///
    /// # Errors
    ///
    /// Any error makes the worker drop the job and tear down `conn`.
    fn run(self: Box<Self>, conn: &mut C) -> Result<(), JobError>;
}

/// Owned, type-erased job as stored by schedulers.
pub type BoxedJob<C> = Box<dyn Job<C>>;

/// Adapter turning a closure into a [`Job`].
///
/// ```rust
/// use prometheus_conpool::core::{FnJob, Job};
///
/// let job = FnJob::with_priority(2, |conn: &mut Vec<u32>| {
///     conn.push(7);
///     Ok(())
/// });
/// assert_eq!(Job::<Vec<u32>>::priority(&job), 2);
/// ```
pub struct FnJob<F> {
    priority: u32,
    f: F,
}

impl<F> FnJob<F> {
    /// Wrap `f` with priority key 0.
    pub fn new<C>(f: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), JobError>,
    {
        Self { priority: 0, f }
    }

    /// Wrap `f` with an explicit priority key.
    pub fn with_priority<C>(priority: u32, f: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), JobError>,
    {
        Self { priority, f }
    }
}

impl<F> fmt::Debug for FnJob<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnJob")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl<C, F> Job<C> for FnJob<F>
where
    F: FnOnce(&mut C) -> Result<(), JobError> + Send + 'static,
{
    fn priority(&self) -> u32 {
        self.priority
    }

    fn run(self: Box<Self>, conn: &mut C) -> Result<(), JobError> {
        (self.f)(conn)
    }
}
