//! Configuration module
//!
//! Handles CLI configuration: API server connection, namespace, and the
//! tracker's polling settings.

use runwatch_client::{ExecutionStore, KubeClient};
use runwatch_tracker::{CompletionPoller, TrackerConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// CLI configuration
///
/// Holds the one execution store every command of an invocation shares, so
/// all requests go through a single connection pool.
#[derive(Clone)]
pub struct Config {
    /// Namespace the runs live in
    pub namespace: String,
    /// Polling settings
    pub tracker: TrackerConfig,
    /// Cancelled on Ctrl-C
    pub cancel: CancellationToken,
    store: Arc<dyn ExecutionStore>,
}

impl Config {
    /// Connects to `api_url`, authenticating with `token` when given
    pub fn new(
        api_url: &str,
        token: Option<String>,
        namespace: String,
        tracker: TrackerConfig,
        cancel: CancellationToken,
    ) -> Self {
        debug!("Using API server {} in namespace {}", api_url, namespace);
        let client = KubeClient::new(api_url);
        let store: Arc<dyn ExecutionStore> = match token {
            Some(token) => Arc::new(client.with_token(token)),
            None => Arc::new(client),
        };

        Self {
            namespace,
            tracker,
            cancel,
            store,
        }
    }

    /// Shared handle to the execution store
    pub fn store(&self) -> Arc<dyn ExecutionStore> {
        Arc::clone(&self.store)
    }

    /// Builds a poller that stops when the user hits Ctrl-C
    pub fn poller(&self) -> CompletionPoller {
        CompletionPoller::new(self.store(), self.tracker.clone()).with_cancellation(self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_share_one_store() {
        let config = Config::new(
            "http://localhost:8001",
            Some("t0k".to_string()),
            "dev".to_string(),
            TrackerConfig::default(),
            CancellationToken::new(),
        );

        assert!(Arc::ptr_eq(&config.store(), &config.store()));
        assert!(Arc::ptr_eq(&config.store(), &config.clone().store()));
    }
}
