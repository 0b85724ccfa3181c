//! Log aggregator
//!
//! Collects the logs of every container in the pod behind a pipeline task.

use runwatch_client::ExecutionStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::resolver::ChildResolver;
use crate::error::{Result, TrackError};

/// Placeholder stored for a container whose log could not be read
pub const LOG_FETCH_FAILED: &str = "failed to get logs";

/// Container name to log text
pub type ContainerLogs = BTreeMap<String, String>;

/// Collects per-container logs of pipeline tasks
#[derive(Clone)]
pub struct LogAggregator {
    store: Arc<dyn ExecutionStore>,
    resolver: ChildResolver,
}

impl LogAggregator {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        let resolver = ChildResolver::new(Arc::clone(&store));
        Self { store, resolver }
    }

    /// Fetches the logs of every container of the task's pod
    ///
    /// A container whose log cannot be read is recorded as
    /// [`LOG_FETCH_FAILED`] and the remaining containers are still fetched,
    /// so callers must check each entry.
    ///
    /// # Errors
    /// - `Fetch` if the pipeline run, task run, or pod cannot be read
    /// - `NotFound` if the pipeline run has no such task
    /// - `MissingField` if the task run has no pod yet
    pub async fn collect_logs(
        &self,
        pipeline_run_name: &str,
        pipeline_task_name: &str,
        namespace: &str,
    ) -> Result<ContainerLogs> {
        let parent = self
            .store
            .get_pipeline_execution(pipeline_run_name, namespace)
            .await?;
        let task = self.resolver.resolve(&parent, pipeline_task_name).await?;

        let pod_name = task.status.pod_name.as_str();
        if pod_name.is_empty() {
            return Err(TrackError::missing_field(
                format!("TaskRun {} of task {:?}", task.metadata, pipeline_task_name),
                "status.podName",
            ));
        }

        let pod = self.store.get_pod(pod_name, namespace).await?;

        let mut logs = ContainerLogs::new();
        for container in pod.container_names() {
            let text = match self.store.get_container_log(pod_name, container, namespace).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to get logs of {}/{}: {}", pod_name, container, e);
                    LOG_FETCH_FAILED.to_string()
                }
            };
            logs.insert(container.to_string(), text);
        }

        debug!("Collected logs of {} container(s) in {}", logs.len(), pod_name);
        Ok(logs)
    }
}
