//! Common types used across CLI modules

use clap::ValueEnum;

/// Condition a `wait` command blocks on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WaitFor {
    /// The run has a completion time, whatever the outcome
    Finished,
    /// The run reported success; store read errors end the wait
    Succeeded,
}

impl std::fmt::Display for WaitFor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitFor::Finished => write!(f, "finished"),
            WaitFor::Succeeded => write!(f, "succeeded"),
        }
    }
}
