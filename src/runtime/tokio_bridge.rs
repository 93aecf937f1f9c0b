//! Tokio bridge: run the blocking pool operations on tokio's blocking pool.
//!
//! `submit` parks the caller while the queue is full and `stop` joins worker
//! threads; neither should run on an async worker thread.

use tokio::task;

use crate::core::{Connector, Job, Pool, PoolError, Scheduler};

impl<K, S> Pool<K, S>
where
    K: Connector,
    S: Scheduler<K::Connection> + 'static,
{
    /// Async form of [`submit`](Pool::submit).
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Pool::submit), plus [`PoolError::Internal`] if the
    /// blocking task was cancelled or panicked.
    pub async fn submit_async<J>(&self, job: J) -> Result<(), PoolError>
    where
        J: Job<K::Connection>,
    {
        let pool = self.clone();
        task::spawn_blocking(move || pool.submit(job))
            .await
            .map_err(|e| PoolError::Internal(format!("blocking submit failed: {e}")))?
    }

    /// Async form of [`stop`](Pool::stop).
    ///
    /// # Errors
    ///
    /// Same as [`stop`](Pool::stop), plus [`PoolError::Internal`] if the
    /// blocking task was cancelled or panicked.
    pub async fn stop_async(&self) -> Result<(), PoolError> {
        let pool = self.clone();
        task::spawn_blocking(move || pool.stop())
            .await
            .map_err(|e| PoolError::Internal(format!("blocking stop failed: {e}")))?
    }
}
