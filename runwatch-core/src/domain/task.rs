//! Task execution (TaskRun) snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::condition::{Condition, Execution};
use super::meta::ObjectMeta;

/// API group and version task runs are served under
pub const TASK_RUN_API_VERSION: &str = "tekton.dev/v1";

pub const TASK_RUN_KIND: &str = "TaskRun";

/// One child execution: consumes params, produces results, runs in a pod
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecution {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TaskExecutionSpec,
    /// Written by the engine only; left out of create bodies while empty
    #[serde(default, skip_serializing_if = "TaskExecutionStatus::is_empty")]
    pub status: TaskExecutionStatus,
}

fn default_api_version() -> String {
    TASK_RUN_API_VERSION.to_string()
}

fn default_kind() -> String {
    TASK_RUN_KIND.to_string()
}

impl Default for TaskExecution {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta::default(),
            spec: TaskExecutionSpec::default(),
            status: TaskExecutionStatus::default(),
        }
    }
}

/// Inputs given to a task execution at creation time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecutionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_template: Option<PodTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<WorkspaceBinding>,
    /// Spec fields not modelled above (`taskSpec`, `timeout`, ...), kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Reference to the task definition a run executes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Named input parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub value: ParamValue,
}

impl Param {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParamValue::String(value.into()),
        }
    }
}

/// Value of a param or result
///
/// The engine allows string, array and object values. Callers here only read
/// string values; the other shapes read as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

impl ParamValue {
    pub fn as_str(&self) -> &str {
        match self {
            ParamValue::String(s) => s,
            ParamValue::Array(_) | ParamValue::Object(_) => "",
        }
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::String(String::new())
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

/// Pod-level overrides applied when the engine schedules the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
}

/// Workspace bound to the run; only `emptyDir` volumes are modelled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceBinding {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDir>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyDir {}

/// Status block of a task execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecutionStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
    /// Empty until a backing pod has been scheduled
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pod_name: String,
    /// Only populated after the run has completed successfully
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_spec: Option<TaskSpec>,
}

impl TaskExecutionStatus {
    /// True for a run the engine has not reconciled yet
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.start_time.is_none()
            && self.completion_time.is_none()
            && self.pod_name.is_empty()
            && self.results.is_empty()
            && self.task_spec.is_none()
    }
}

/// Named output of a task execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub result_type: String,
    #[serde(default)]
    pub value: ParamValue,
}

impl TaskResult {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result_type: "string".to_string(),
            value: ParamValue::String(value.into()),
        }
    }
}

/// Resolved task definition recorded in the run's status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_template: Option<StepTemplate>,
}

/// Settings inherited by every step of the task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    #[serde(default)]
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl TaskExecution {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            ..Default::default()
        }
    }

    /// Step template env vars, empty if the run has no step template
    pub fn step_env(&self) -> Option<&[EnvVar]> {
        self.status.task_spec.as_ref().map(|spec| {
            spec.step_template
                .as_ref()
                .map(|t| t.env.as_slice())
                .unwrap_or_default()
        })
    }
}

impl Execution for TaskExecution {
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
