//! Status conditions and the execution state derived from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;

/// Condition type the engine uses to report the outcome of a run
pub const SUCCEEDED: &str = "Succeeded";

/// Reason reported while a run is waiting for its pod to be scheduled
pub const REASON_PENDING: &str = "Pending";

/// A single entry of `status.conditions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    pub fn new(condition_type: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
            ..Default::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

/// Tri-state condition status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// Returns the first condition of the given type
pub fn find_condition<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
}

/// Lifecycle state of an execution, derived from a single snapshot
///
/// The engine has no explicit "running" flag: a run is running while it has
/// no completion time and no terminal `Succeeded` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl ExecutionState {
    /// Maps a condition sequence and completion time to a state
    ///
    /// Any `Succeeded=True` condition wins. Otherwise the first `Succeeded`
    /// condition decides; a run that has completed without reporting success
    /// is `Failed`.
    pub fn derive(conditions: &[Condition], completion_time: Option<&DateTime<Utc>>) -> Self {
        let succeeded = conditions
            .iter()
            .any(|c| c.condition_type == SUCCEEDED && c.status == ConditionStatus::True);
        if succeeded {
            return ExecutionState::Succeeded;
        }

        match find_condition(conditions, SUCCEEDED) {
            Some(c) if c.status == ConditionStatus::False => ExecutionState::Failed,
            _ if completion_time.is_some() => ExecutionState::Failed,
            Some(c) if c.reason == REASON_PENDING => ExecutionState::Pending,
            Some(_) => ExecutionState::Running,
            None => ExecutionState::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Succeeded | ExecutionState::Failed)
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionState::Pending => write!(f, "Pending"),
            ExecutionState::Running => write!(f, "Running"),
            ExecutionState::Succeeded => write!(f, "Succeeded"),
            ExecutionState::Failed => write!(f, "Failed"),
        }
    }
}

/// Common view over pipeline and task executions
///
/// Both kinds report completion the same way, so the finished and succeeded
/// predicates are defined once here.
pub trait Execution {
    fn metadata(&self) -> &ObjectMeta;

    fn conditions(&self) -> &[Condition];

    fn completion_time(&self) -> Option<&DateTime<Utc>>;

    /// True once the engine has recorded a completion time, whatever the outcome
    fn is_finished(&self) -> bool {
        self.completion_time().is_some()
    }

    /// True if any condition reports `Succeeded=True`
    fn is_succeeded(&self) -> bool {
        self.conditions()
            .iter()
            .any(|c| c.condition_type == SUCCEEDED && c.status == ConditionStatus::True)
    }

    fn state(&self) -> ExecutionState {
        ExecutionState::derive(self.conditions(), self.completion_time())
    }
}
