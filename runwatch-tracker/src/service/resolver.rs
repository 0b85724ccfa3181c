//! Child resolver
//!
//! Maps a logical pipeline task name to the task run the engine created for it.

use runwatch_client::ExecutionStore;
use runwatch_core::domain::pipeline::{ChildReference, PipelineExecution};
use runwatch_core::domain::task::TaskExecution;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, TrackError};

/// Resolves logical task names against a pipeline execution snapshot
#[derive(Clone)]
pub struct ChildResolver {
    store: Arc<dyn ExecutionStore>,
}

impl ChildResolver {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self { store }
    }

    /// Fetches the task run behind `pipeline_task_name`
    ///
    /// The first child reference with a matching name wins. A missing
    /// reference is `NotFound`; the child may still appear in a later
    /// snapshot of the parent, so callers that expect it should re-fetch the
    /// parent and try again rather than retry this call.
    ///
    /// # Errors
    /// - `NotFound` if no child reference matches
    /// - `Fetch` with the store's error if the task run cannot be read
    pub async fn resolve(
        &self,
        parent: &PipelineExecution,
        pipeline_task_name: &str,
    ) -> Result<TaskExecution> {
        let child = parent.child_reference(pipeline_task_name).ok_or_else(|| {
            TrackError::not_found(format!(
                "task {:?} not found in PipelineRun {}",
                pipeline_task_name, parent.metadata
            ))
        })?;

        debug!(
            "Resolved task {} of {} to {}",
            pipeline_task_name, parent.metadata, child.name
        );
        self.fetch(parent, child).await
    }

    /// Fetches every child of the parent, in reference order
    ///
    /// Stops at the first child that cannot be read.
    pub async fn resolve_all<'p>(
        &self,
        parent: &'p PipelineExecution,
    ) -> Result<Vec<(&'p ChildReference, TaskExecution)>> {
        let mut children = Vec::with_capacity(parent.status.child_references.len());
        for child in &parent.status.child_references {
            let task = self.fetch(parent, child).await?;
            children.push((child, task));
        }
        Ok(children)
    }

    async fn fetch(&self, parent: &PipelineExecution, child: &ChildReference) -> Result<TaskExecution> {
        Ok(self
            .store
            .get_task_execution(&child.name, &parent.metadata.namespace)
            .await?)
    }
}
