//! Pipeline run endpoints

use crate::KubeClient;
use crate::error::Result;
use runwatch_core::domain::pipeline::PipelineExecution;

impl KubeClient {
    /// Get a pipeline run by name
    ///
    /// # Arguments
    /// * `name` - The pipeline run name
    /// * `namespace` - The namespace it lives in
    ///
    /// # Returns
    /// A fresh snapshot of the pipeline run
    pub async fn get_pipeline_run(&self, name: &str, namespace: &str) -> Result<PipelineExecution> {
        let url = self.tekton_url(namespace, &format!("pipelineruns/{}", name));
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response, &format!("pipelinerun {}/{}", namespace, name))
            .await
    }
}
