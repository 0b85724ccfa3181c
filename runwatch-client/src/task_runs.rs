//! Task run endpoints

use crate::KubeClient;
use crate::error::Result;
use runwatch_core::domain::task::{TASK_RUN_API_VERSION, TASK_RUN_KIND, TaskExecution};
use tracing::debug;

impl KubeClient {
    /// Get a task run by name
    ///
    /// # Arguments
    /// * `name` - The task run name
    /// * `namespace` - The namespace it lives in
    pub async fn get_task_run(&self, name: &str, namespace: &str) -> Result<TaskExecution> {
        let url = self.tekton_url(namespace, &format!("taskruns/{}", name));
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response, &format!("taskrun {}/{}", namespace, name))
            .await
    }

    /// Create a task run
    ///
    /// The namespace argument wins over whatever `metadata.namespace` says.
    ///
    /// # Returns
    /// The task run as stored by the server
    ///
    /// # Example
    /// ```no_run
    /// # use runwatch_client::KubeClient;
    /// # use runwatch_core::domain::task::{Param, TaskExecution};
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = KubeClient::new("http://localhost:8001");
    /// let mut task = TaskExecution::new("verify-1", "dev");
    /// task.spec.params.push(Param::string("IMAGE", "quay.io/org/app:1"));
    ///
    /// let created = client.create_task_run(&task, "dev").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_task_run(&self, task: &TaskExecution, namespace: &str) -> Result<TaskExecution> {
        let body = create_body(task, namespace);

        let url = self.tekton_url(namespace, "taskruns");
        debug!("Creating taskrun {}", body.metadata);
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        self.handle_response(response, &format!("taskrun {}", body.metadata))
            .await
    }

    /// Delete every task run in a namespace
    pub async fn delete_all_task_runs(&self, namespace: &str) -> Result<()> {
        let url = self.tekton_url(namespace, "taskruns");
        let response = self.authorize(self.client.delete(&url)).send().await?;

        self.handle_empty_response(response, &format!("taskruns in {}", namespace))
            .await
    }
}

/// Body POSTed for `task`: pinned to `namespace` and typed as a TaskRun
fn create_body(task: &TaskExecution, namespace: &str) -> TaskExecution {
    let mut body = task.clone();
    body.metadata.namespace = namespace.to_string();
    if body.api_version.is_empty() {
        body.api_version = TASK_RUN_API_VERSION.to_string();
    }
    if body.kind.is_empty() {
        body.kind = TASK_RUN_KIND.to_string();
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_is_typed_and_keeps_inline_task_spec() {
        let mut task: TaskExecution = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "verify-1", "namespace": "elsewhere" },
            "spec": {
                "timeout": "10m",
                "taskSpec": { "steps": [ { "name": "check", "image": "quay.io/skopeo" } ] }
            }
        }))
        .unwrap();
        task.kind.clear();

        let body = serde_json::to_value(create_body(&task, "dev")).unwrap();
        assert_eq!(body["apiVersion"], "tekton.dev/v1");
        assert_eq!(body["kind"], "TaskRun");
        assert_eq!(body["metadata"]["namespace"], "dev");
        assert_eq!(body["spec"]["timeout"], "10m");
        assert_eq!(body["spec"]["taskSpec"]["steps"][0]["name"], "check");
        assert!(body.get("status").is_none());
    }
}
