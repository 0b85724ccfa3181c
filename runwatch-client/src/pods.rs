//! Pod endpoints

use crate::KubeClient;
use crate::error::Result;
use runwatch_core::domain::pod::Pod;

impl KubeClient {
    /// Get a pod by name
    pub async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod> {
        let url = self.core_url(namespace, &format!("pods/{}", name));
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response, &format!("pod {}/{}", namespace, name))
            .await
    }

    /// Get the full log of one container of a pod
    ///
    /// # Arguments
    /// * `pod_name` - The pod name
    /// * `container` - The container whose log to read
    /// * `namespace` - The namespace of the pod
    pub async fn get_container_log(
        &self,
        pod_name: &str,
        container: &str,
        namespace: &str,
    ) -> Result<String> {
        let url = self.core_url(namespace, &format!("pods/{}/log", pod_name));
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("container", container)])
            .send()
            .await?;

        self.handle_text_response(
            response,
            &format!("log of {}/{} container {}", namespace, pod_name, container),
        )
        .await
    }
}
