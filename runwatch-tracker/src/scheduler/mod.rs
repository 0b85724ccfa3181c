//! Scheduler layer
//!
//! Bounded waits on executions, and the create-then-wait flow built on top
//! of them. A wait runs on the caller's task: nothing here spawns background
//! work, and two callers waiting on the same run each read the store.

pub mod poller;
pub mod runner;

pub use poller::{CompletionPoller, PollPolicy};
pub use runner::TaskRunner;
