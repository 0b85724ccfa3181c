//! Pipeline execution (PipelineRun) snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::{Condition, Execution};
use super::meta::ObjectMeta;

/// A parent execution that fans out into named task executions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineExecution {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: PipelineExecutionStatus,
}

/// Status block of a pipeline execution
///
/// `child_references` is filled in by the engine as children get scheduled,
/// so it may be empty or name children that cannot be fetched yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecutionStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub child_references: Vec<ChildReference>,
}

/// Pointer from a pipeline execution to one of its children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildReference {
    /// Name of the child object in the store
    pub name: String,
    /// Logical task name inside the pipeline definition
    pub pipeline_task_name: String,
    #[serde(default)]
    pub kind: String,
}

impl ChildReference {
    pub fn task_run(pipeline_task_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline_task_name: pipeline_task_name.into(),
            kind: "TaskRun".to_string(),
        }
    }
}

impl PipelineExecution {
    /// First child reference for a logical task name
    pub fn child_reference(&self, pipeline_task_name: &str) -> Option<&ChildReference> {
        self.status
            .child_references
            .iter()
            .find(|c| c.pipeline_task_name == pipeline_task_name)
    }

    /// True if the run has both finished and reported success
    pub fn has_succeeded(&self) -> bool {
        self.is_finished() && self.is_succeeded()
    }
}

impl Execution for PipelineExecution {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn conditions(&self) -> &[Condition] {
        &self.status.conditions
    }

    fn completion_time(&self) -> Option<&DateTime<Utc>> {
        self.status.completion_time.as_ref()
    }
}
