//! Runwatch Kubernetes Client
//!
//! A small, type-safe HTTP client for reading pipeline executions from a
//! Kubernetes API server running Tekton.
//!
//! The client is the only place that knows about URLs and status codes. Everything
//! above it talks to the [`ExecutionStore`] trait, so tests can swap in a fake store.
//!
//! # Example
//!
//! ```no_run
//! use runwatch_client::KubeClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = KubeClient::new("https://api.cluster.example:6443").with_token("sha256~token");
//!
//!     let run = client.get_pipeline_run("release-x7k2", "managed").await?;
//!     println!("{} has {} children", run.metadata, run.status.child_references.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipeline_runs;
mod pods;
pub mod store;
mod task_runs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use store::ExecutionStore;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// API group path for Tekton resources
const TEKTON_API: &str = "apis/tekton.dev/v1";

/// API group path for core resources
const CORE_API: &str = "api/v1";

/// HTTP client for the Kubernetes API server
///
/// Methods are organized into logical groups:
/// - Pipeline runs (get)
/// - Task runs (get, create, delete all in a namespace)
/// - Pods (get, container logs)
#[derive(Debug, Clone)]
pub struct KubeClient {
    /// Base URL of the API server (e.g., "https://api.cluster.example:6443")
    base_url: String,
    /// Bearer token sent with every request
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl KubeClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API server
    ///
    /// # Example
    /// ```
    /// use runwatch_client::KubeClient;
    ///
    /// let client = KubeClient::new("http://localhost:8001");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use runwatch_client::KubeClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = KubeClient::with_client("http://localhost:8001", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Authenticate every request with a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the API server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // URL Builders
    // =============================================================================

    fn tekton_url(&self, namespace: &str, resource: &str) -> String {
        format!(
            "{}/{}/namespaces/{}/{}",
            self.base_url, TEKTON_API, namespace, resource
        )
    }

    fn core_url(&self, namespace: &str, resource: &str) -> String {
        format!(
            "{}/{}/namespaces/{}/{}",
            self.base_url, CORE_API, namespace, resource
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code, turning failures into a [`ClientError`]
    ///
    /// A 404 becomes `NotFound` carrying `what`, so callers can tell a missing
    /// object from a failing server.
    async fn check_status(&self, response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), status_message(&error_text)));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        self.check_status(response, what)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }

    /// Handle an API response with a plain text body (e.g., container logs)
    async fn handle_text_response(&self, response: reqwest::Response, what: &str) -> Result<String> {
        Ok(self.check_status(response, what).await?.text().await?)
    }

    /// Handle an API response whose body is ignored (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response, what: &str) -> Result<()> {
        self.check_status(response, what).await?;
        Ok(())
    }
}

/// Message of a `kind: Status` error body, or the raw body when it is not one
fn status_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = KubeClient::new("http://localhost:8001");
        assert_eq!(client.base_url(), "http://localhost:8001");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = KubeClient::new("http://localhost:8001/");
        assert_eq!(client.base_url(), "http://localhost:8001");
    }

    #[test]
    fn test_client_with_token() {
        let client = KubeClient::with_client("http://localhost:8001", Client::new()).with_token("t0k");
        assert_eq!(client.token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_resource_urls() {
        let client = KubeClient::new("https://api.example:6443/");
        assert_eq!(
            client.tekton_url("dev", "taskruns/build-1"),
            "https://api.example:6443/apis/tekton.dev/v1/namespaces/dev/taskruns/build-1"
        );
        assert_eq!(
            client.core_url("dev", "pods/build-1-pod"),
            "https://api.example:6443/api/v1/namespaces/dev/pods/build-1-pod"
        );
    }

    #[test]
    fn test_status_message_from_status_body() {
        let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"taskruns.tekton.dev \"copy-1\" already exists","reason":"AlreadyExists","code":409}"#;
        assert_eq!(status_message(body), "taskruns.tekton.dev \"copy-1\" already exists");
        assert_eq!(status_message("upstream connect error"), "upstream connect error");
    }
}
