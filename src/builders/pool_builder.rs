//! Builders to construct schedulers and pools from configuration.

use crate::config::{PoolConfig, SchedulerConfig};
use crate::core::{
    AgeingPriorityScheduler, Connector, FcfsScheduler, Pool, PoolError, PriorityScheduler,
    Scheduler,
};

/// Scheduler chosen at runtime from a [`SchedulerConfig`].
pub type DynScheduler<C> = Box<dyn Scheduler<C>>;

/// Build the scheduler described by `cfg`.
///
/// # Errors
///
/// Returns [`PoolError::InvalidConfig`] for zero priority levels or a zero
/// ageing frequency.
pub fn build_scheduler<C: 'static>(cfg: &SchedulerConfig) -> Result<DynScheduler<C>, PoolError> {
    cfg.validate().map_err(PoolError::InvalidConfig)?;
    let scheduler: DynScheduler<C> = match *cfg {
        SchedulerConfig::Fcfs => Box::new(FcfsScheduler::new()),
        SchedulerConfig::Priority { levels } => Box::new(PriorityScheduler::new(levels)?),
        SchedulerConfig::Ageing { levels, frequency } => {
            Box::new(AgeingPriorityScheduler::new(levels, frequency)?)
        }
    };
    Ok(scheduler)
}

/// Build an idle pool whose scheduler comes from `config.scheduler`.
///
/// # Errors
///
/// Returns [`PoolError::InvalidConfig`] if the configuration is invalid.
pub fn build_pool<K>(
    config: PoolConfig,
    connector: K,
) -> Result<Pool<K, DynScheduler<K::Connection>>, PoolError>
where
    K: Connector,
{
    config.validate().map_err(PoolError::InvalidConfig)?;
    let scheduler = build_scheduler(&config.scheduler)?;
    Pool::new(config, scheduler, connector)
}
