//! Pool, scheduler and reconnect configuration structures.

use std::env;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, Credentials};

/// Default queue capacity when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
/// Default worker thread stack size (2 MiB).
pub const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

fn default_worker_count() -> usize {
    num_cpus::get()
}

const fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

const fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

fn default_thread_name_prefix() -> String {
    "conpool-worker".into()
}

/// Scheduling discipline selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedulerConfig {
    /// First-come-first-served.
    #[default]
    Fcfs,
    /// Strict priority over `levels` keys.
    Priority {
        /// Number of priority levels (keys `0..levels`).
        levels: u32,
    },
    /// Priority with completion-driven ageing.
    Ageing {
        /// Number of priority levels (keys `0..levels`).
        levels: u32,
        /// Retrievals between two ageing passes.
        frequency: u64,
    },
}

impl SchedulerConfig {
    /// Validate scheduler parameters.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Fcfs => Ok(()),
            Self::Priority { levels } => {
                if levels == 0 {
                    return Err("priority levels must be greater than 0".into());
                }
                Ok(())
            }
            Self::Ageing { levels, frequency } => {
                if levels == 0 {
                    return Err("priority levels must be greater than 0".into());
                }
                if frequency == 0 {
                    return Err("ageing frequency must be at least 1".into());
                }
                Ok(())
            }
        }
    }
}

/// Reconnect policy applied when a worker loses or cannot open its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Retries after a failed connect; `0` retires the worker immediately.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for the doubling delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 5_000,
        }
    }
}

impl ReconnectConfig {
    /// Policy that never retries: a worker whose connection fails exits.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_attempts: 0,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay before retry number `attempt` (0-based), doubling up to the cap.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Validate the policy.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts > 0 && self.initial_backoff_ms > self.max_backoff_ms {
            return Err("initial_backoff_ms must not exceed max_backoff_ms".into());
        }
        Ok(())
    }
}

/// Pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of worker threads (one connection each).
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Maximum number of pending jobs.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Endpoint and login used by every worker.
    #[serde(default)]
    pub endpoint: Credentials,
    /// Scheduling discipline.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Reconnect policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Worker thread stack size in bytes.
    #[serde(default = "default_stack_size")]
    pub thread_stack_size: usize,
    /// Worker thread name prefix; threads are named `{prefix}-{id}`.
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            endpoint: Credentials::default(),
            scheduler: SchedulerConfig::default(),
            reconnect: ReconnectConfig::default(),
            thread_stack_size: DEFAULT_STACK_SIZE,
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

impl PoolConfig {
    /// Configuration with defaults: one worker per CPU core, 1024 queue slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the endpoint credentials.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Credentials) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the scheduling discipline.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate pool configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.thread_stack_size == 0 {
            return Err("thread_stack_size must be greater than 0".into());
        }
        if self.endpoint.address.is_empty() {
            return Err("endpoint address must not be empty".into());
        }
        self.scheduler
            .validate()
            .map_err(|e| format!("scheduler invalid: {e}"))?;
        self.reconnect
            .validate()
            .map_err(|e| format!("reconnect invalid: {e}"))?;
        Ok(())
    }

    /// Parse pool configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `CONPOOL_*` environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Recognised variables: `CONPOOL_WORKERS`, `CONPOOL_QUEUE_CAPACITY`,
    /// `CONPOOL_ADDRESS`, `CONPOOL_USER`, `CONPOOL_PASSWORD`,
    /// `CONPOOL_SCHEDULER` (a JSON [`SchedulerConfig`]). Unset variables keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be parsed or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Ok(raw) = env::var("CONPOOL_WORKERS") {
            cfg.worker_count = raw
                .parse()
                .with_context(|| format!("CONPOOL_WORKERS is not a count: {raw}"))?;
        }
        if let Ok(raw) = env::var("CONPOOL_QUEUE_CAPACITY") {
            cfg.queue_capacity = raw
                .parse()
                .with_context(|| format!("CONPOOL_QUEUE_CAPACITY is not a count: {raw}"))?;
        }
        if let Ok(address) = env::var("CONPOOL_ADDRESS") {
            cfg.endpoint.address = address;
        }
        if let Ok(user) = env::var("CONPOOL_USER") {
            cfg.endpoint.user = user;
        }
        if let Ok(password) = env::var("CONPOOL_PASSWORD") {
            cfg.endpoint.password = password;
        }
        if let Ok(raw) = env::var("CONPOOL_SCHEDULER") {
            cfg.scheduler = serde_json::from_str(&raw).context("CONPOOL_SCHEDULER is not valid")?;
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = ReconnectConfig {
            max_attempts: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
        assert_eq!(policy.backoff(4), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(90), Duration::from_millis(1_000));
    }

    #[test]
    fn test_defaults_validate() {
        let cfg = PoolConfig::new();
        assert!(cfg.worker_count >= 1);
        assert_eq!(cfg.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_ageing_frequency_zero_invalid() {
        let cfg = PoolConfig::new().with_scheduler(SchedulerConfig::Ageing {
            levels: 4,
            frequency: 0,
        });
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("frequency"), "{err}");
    }
}
