//! Execution store abstraction
//!
//! The trait is the seam between the tracker and the API server. The tracker
//! only ever reads snapshots, creates task runs, and reads logs through it.

use async_trait::async_trait;
use runwatch_core::domain::pipeline::PipelineExecution;
use runwatch_core::domain::pod::Pod;
use runwatch_core::domain::task::TaskExecution;

use crate::KubeClient;
use crate::error::Result;

/// Access to pipeline runs, task runs, pods and their logs
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Fetches a pipeline run snapshot
    async fn get_pipeline_execution(&self, name: &str, namespace: &str) -> Result<PipelineExecution>;

    /// Fetches a task run snapshot
    async fn get_task_execution(&self, name: &str, namespace: &str) -> Result<TaskExecution>;

    /// Creates a task run in `namespace` and returns the stored object
    async fn create_task_execution(
        &self,
        task: &TaskExecution,
        namespace: &str,
    ) -> Result<TaskExecution>;

    /// Deletes every task run in `namespace`
    async fn delete_task_executions(&self, namespace: &str) -> Result<()>;

    /// Fetches a pod
    async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod>;

    /// Fetches the log text of one container
    async fn get_container_log(
        &self,
        pod_name: &str,
        container: &str,
        namespace: &str,
    ) -> Result<String>;
}

#[async_trait]
impl ExecutionStore for KubeClient {
    async fn get_pipeline_execution(&self, name: &str, namespace: &str) -> Result<PipelineExecution> {
        self.get_pipeline_run(name, namespace).await
    }

    async fn get_task_execution(&self, name: &str, namespace: &str) -> Result<TaskExecution> {
        self.get_task_run(name, namespace).await
    }

    async fn create_task_execution(
        &self,
        task: &TaskExecution,
        namespace: &str,
    ) -> Result<TaskExecution> {
        self.create_task_run(task, namespace).await
    }

    async fn delete_task_executions(&self, namespace: &str) -> Result<()> {
        self.delete_all_task_runs(namespace).await
    }

    async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod> {
        KubeClient::get_pod(self, name, namespace).await
    }

    async fn get_container_log(
        &self,
        pod_name: &str,
        container: &str,
        namespace: &str,
    ) -> Result<String> {
        KubeClient::get_container_log(self, pod_name, container, namespace).await
    }
}
