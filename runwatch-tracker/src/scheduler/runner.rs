//! Task runner
//!
//! Creates task runs and waits for them to finish.

use runwatch_client::ExecutionStore;
use runwatch_core::domain::condition::Execution;
use runwatch_core::domain::task::TaskExecution;
use runwatch_core::dto::task::ImageCopyRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::poller::CompletionPoller;
use crate::config::TrackerConfig;
use crate::error::Result;

/// Creates task runs and awaits their completion
#[derive(Clone)]
pub struct TaskRunner {
    store: Arc<dyn ExecutionStore>,
    poller: CompletionPoller,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn ExecutionStore>, config: TrackerConfig) -> Self {
        let poller = CompletionPoller::new(Arc::clone(&store), config);
        Self { store, poller }
    }

    /// Aborts a pending wait once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.poller = self.poller.with_cancellation(token);
        self
    }

    /// Creates `task` in `namespace` and waits for it under the configured run timeout
    ///
    /// Returns a snapshot fetched after the run finished, whatever its outcome.
    /// On timeout no snapshot is returned.
    pub async fn run_and_await(&self, task: &TaskExecution, namespace: &str) -> Result<TaskExecution> {
        let timeout = self.poller.config().run_timeout;
        self.run_and_await_with_timeout(task, namespace, timeout)
            .await
    }

    /// Same as [`run_and_await`](Self::run_and_await) with an explicit bound
    pub async fn run_and_await_with_timeout(
        &self,
        task: &TaskExecution,
        namespace: &str,
        timeout: Duration,
    ) -> Result<TaskExecution> {
        let created = self.store.create_task_execution(task, namespace).await?;
        let name = created.metadata.name.as_str();
        info!("Created taskrun {}", created.metadata);

        self.poller
            .wait_task_finished(name, namespace, timeout)
            .await?;

        let task = self.store.get_task_execution(name, namespace).await?;
        info!("Taskrun {} finished: {}", task.metadata, task.state());
        Ok(task)
    }

    /// Submits a task run that copies an image to a second repository
    pub async fn create_image_copy(&self, request: ImageCopyRequest) -> Result<TaskExecution> {
        let namespace = request.namespace.clone();
        let task = request.into_task_execution();
        Ok(self.store.create_task_execution(&task, &namespace).await?)
    }

    /// Deletes every task run in `namespace`
    pub async fn purge(&self, namespace: &str) -> Result<()> {
        info!("Deleting all taskruns in {}", namespace);
        Ok(self.store.delete_task_executions(namespace).await?)
    }
}
