//! Error types for pool, resource and job operations.

use thiserror::Error;

/// Errors produced by the pool and its schedulers.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Submission arrived after shutdown was requested; nothing was queued.
    #[error("pool is shutting down; submission rejected")]
    ShuttingDown,
    /// Job priority key is outside the scheduler's level range.
    #[error("priority {priority} out of range for {levels} levels")]
    PriorityOutOfRange {
        /// Key carried by the job.
        priority: u32,
        /// Number of levels the scheduler was built with.
        levels: u32,
    },
    /// `start` was called on a pool that is already running or draining.
    #[error("pool is already running")]
    AlreadyRunning,
    /// `stop` was called on a pool that is not running.
    #[error("pool is not running")]
    NotRunning,
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// Internal failure (blocking bridge task panicked, etc.).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors reported by a [`Connector`](crate::core::Connector) or a live connection.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The connection could not be established.
    #[error("connection to {address} failed: {reason}")]
    Connect {
        /// Endpoint that was dialed.
        address: String,
        /// Driver-provided reason.
        reason: String,
    },
    /// The driver rejected an operation.
    #[error("resource error {code} (state {state}): {message}")]
    Driver {
        /// Vendor error code.
        code: i32,
        /// Standard state string (SQLSTATE-style).
        state: String,
        /// Human-readable message.
        message: String,
    },
    /// The connection was already torn down.
    #[error("connection closed")]
    Closed,
}

/// Failure of a single job; the executing worker discards its connection.
#[derive(Debug, Error)]
pub enum JobError {
    /// The resource handle failed underneath the job.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// The job reported a failure of its own.
    #[error("job failed: {0}")]
    Failed(String),
    /// The job panicked while running.
    #[error("job panicked: {0}")]
    Panicked(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_converts_into_job_error() {
        let err: JobError = ResourceError::Closed.into();
        assert!(matches!(err, JobError::Resource(ResourceError::Closed)));
        assert_eq!(err.to_string(), "connection closed");
    }

    #[test]
    fn test_io_error_converts_into_spawn() {
        let io = std::io::Error::other("no threads left");
        let err: PoolError = io.into();
        assert_eq!(err.to_string(), "failed to spawn worker thread: no threads left");
    }
}
