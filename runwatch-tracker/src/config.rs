//! Tracker configuration
//!
//! Defines the polling parameters shared by every wait: how often the store
//! is re-read and how long a created task run is awaited by default.

use std::time::Duration;

/// Default pause between two reads of a polled execution
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default bound for awaiting a task run created by the tracker
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(100);

/// Tracker configuration
///
/// Passed explicitly to each component; nothing reads it from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Fixed interval between two checks of a polled execution
    pub poll_interval: Duration,

    /// How long `run_and_await` waits for a created task run to finish
    pub run_timeout: Duration,
}

impl TrackerConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - RUNWATCH_POLL_INTERVAL (optional, seconds, default: 1)
    /// - RUNWATCH_RUN_TIMEOUT (optional, seconds, default: 100)
    pub fn from_env() -> anyhow::Result<Self> {
        let poll_interval = std::env::var("RUNWATCH_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let run_timeout = std::env::var("RUNWATCH_RUN_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RUN_TIMEOUT);

        let config = Self {
            poll_interval,
            run_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.run_timeout.is_zero() {
            anyhow::bail!("run_timeout must be greater than 0");
        }

        if self.poll_interval > self.run_timeout {
            anyhow::bail!(
                "poll_interval ({:?}) cannot exceed run_timeout ({:?})",
                self.poll_interval,
                self.run_timeout
            );
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}
