//! Executor and convergence configuration

use std::time::Duration;

use tabsync_core::{SyncError, SyncResult};

/// Convergence wait configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvergenceConfig {
    /// Interval between loading-state polls
    pub poll_interval: Duration,
    /// Polling time after which the wait may be overridden
    pub grace_period: Duration,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        ConvergenceConfig {
            poll_interval: Duration::from_millis(250),
            grace_period: Duration::from_secs(5),
        }
    }
}

impl ConvergenceConfig {
    /// Slow links or heavy pages
    pub fn patient() -> Self {
        ConvergenceConfig {
            poll_interval: Duration::from_secs(1),
            grace_period: Duration::from_secs(30),
        }
    }

    /// Tight loop for simulated systems
    pub fn eager() -> Self {
        ConvergenceConfig {
            poll_interval: Duration::from_millis(50),
            grace_period: Duration::from_secs(1),
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.poll_interval.is_zero() {
            return Err(SyncError::invalid("poll interval must be non-zero"));
        }
        Ok(())
    }
}

/// Reconciliation executor configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub convergence: ConvergenceConfig,
    /// Collapse groups when labelling them
    pub collapse_groups: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            convergence: ConvergenceConfig::default(),
            collapse_groups: true,
        }
    }
}
