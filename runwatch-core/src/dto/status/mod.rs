//! Status report for one task of a pipeline execution

use serde::{Deserialize, Serialize};

use crate::domain::condition::ExecutionState;
use crate::domain::task::TaskExecutionStatus;

/// Full status of the task run behind a logical pipeline task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTaskStatus {
    pub pipeline_task_name: String,
    pub status: TaskExecutionStatus,
}

impl PipelineTaskStatus {
    pub fn state(&self) -> ExecutionState {
        ExecutionState::derive(&self.status.conditions, self.status.completion_time.as_ref())
    }
}
