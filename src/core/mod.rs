//! Pool, scheduling disciplines, jobs and the resource-handle boundary.

pub mod connector;
pub mod error;
pub mod job;
pub mod pool;
pub mod scheduler;
mod worker;

pub use connector::{Connector, Credentials};
pub use error::{AppResult, JobError, PoolError, ResourceError};
pub use job::{BoxedJob, FnJob, Job};
pub use pool::{Pool, PoolStats};
pub use scheduler::{
    AgeingPriorityScheduler, BoundScheduler, FcfsScheduler, PendingRank, PoolState,
    PriorityScheduler, Scheduler,
};
