//! Runwatch Tracker
//!
//! Follows pipeline executions and extracts their outcomes.
//!
//! Architecture:
//! - Configuration: polling interval and default run timeout
//! - Services: child resolution, result/param/env extraction, log collection
//! - Scheduler: bounded completion polling and the create-then-wait flow
//!
//! Every component takes its store handle and configuration in its
//! constructor; there is no shared global state.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use runwatch_client::{ExecutionStore, KubeClient};
//! use runwatch_tracker::{ChildResolver, CompletionPoller, ResultExtractor, TrackerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store: Arc<dyn ExecutionStore> = Arc::new(KubeClient::new("http://localhost:8001"));
//! let poller = CompletionPoller::new(store.clone(), TrackerConfig::default());
//!
//! let run = poller
//!     .wait_pipeline_finished("build-x7k2", "dev", std::time::Duration::from_secs(900))
//!     .await?;
//! let extractor = ResultExtractor::new(ChildResolver::new(store));
//! let digest = extractor.get_result_for_task(&run, "build-container", "IMAGE_DIGEST").await?;
//! println!("built {}", digest);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::TrackerConfig;
pub use error::{Result, TrackError};
pub use scheduler::{CompletionPoller, PollPolicy, TaskRunner};
pub use service::{
    ChildResolver, ContainerLogs, LOG_FETCH_FAILED, LogAggregator, ResultExtractor, get_env,
    get_param, get_result,
};
