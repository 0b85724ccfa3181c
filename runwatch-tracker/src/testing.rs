//! Scripted in-memory execution store for tests

use async_trait::async_trait;
use chrono::Utc;
use runwatch_client::{ClientError, ExecutionStore, Result};
use runwatch_core::domain::condition::{Condition, ConditionStatus, SUCCEEDED};
use runwatch_core::domain::pipeline::{ChildReference, PipelineExecution};
use runwatch_core::domain::pod::{Container, Pod};
use runwatch_core::domain::task::TaskExecution;
use std::collections::HashMap;
use std::sync::Mutex;

/// One scripted answer to a task run fetch
#[derive(Debug, Clone)]
pub enum Step {
    Ready(TaskExecution),
    Unavailable,
}

/// Replays its steps in order, then repeats the last one forever
#[derive(Debug, Default)]
struct Script {
    steps: Vec<Step>,
    reads: usize,
}

impl Script {
    fn next(&mut self) -> Option<Step> {
        let idx = self.reads.min(self.steps.len().checked_sub(1)?);
        self.reads += 1;
        Some(self.steps[idx].clone())
    }
}

#[derive(Default)]
pub struct FakeStore {
    pipelines: Mutex<HashMap<String, PipelineExecution>>,
    tasks: Mutex<HashMap<String, Script>>,
    pods: Mutex<HashMap<String, Pod>>,
    logs: Mutex<HashMap<(String, String), Option<String>>>,
    created: Mutex<Vec<TaskExecution>>,
    create_script: Mutex<Option<Vec<Step>>>,
    reject_create: Mutex<bool>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(self, pipeline: PipelineExecution) -> Self {
        self.pipelines
            .lock()
            .unwrap()
            .insert(pipeline.metadata.name.clone(), pipeline);
        self
    }

    pub fn with_task(self, task: TaskExecution) -> Self {
        let name = task.metadata.name.clone();
        self.with_task_script(&name, vec![Step::Ready(task)])
    }

    pub fn with_task_script(self, name: &str, steps: Vec<Step>) -> Self {
        self.tasks
            .lock()
            .unwrap()
            .insert(name.to_string(), Script { steps, reads: 0 });
        self
    }

    pub fn with_pod(self, name: &str, containers: &[&str]) -> Self {
        let mut pod = Pod::default();
        pod.metadata.name = name.to_string();
        pod.spec.containers = containers
            .iter()
            .map(|c| Container {
                name: c.to_string(),
                image: String::new(),
            })
            .collect();
        self.pods.lock().unwrap().insert(name.to_string(), pod);
        self
    }

    pub fn with_log(self, pod: &str, container: &str, text: &str) -> Self {
        self.logs
            .lock()
            .unwrap()
            .insert((pod.to_string(), container.to_string()), Some(text.to_string()));
        self
    }

    pub fn with_failing_log(self, pod: &str, container: &str) -> Self {
        self.logs
            .lock()
            .unwrap()
            .insert((pod.to_string(), container.to_string()), None);
        self
    }

    /// Steps replayed for the next task run created through the store
    pub fn with_create_script(self, steps: Vec<Step>) -> Self {
        *self.create_script.lock().unwrap() = Some(steps);
        self
    }

    pub fn rejecting_creates(self) -> Self {
        *self.reject_create.lock().unwrap() = true;
        self
    }

    pub fn task_reads(&self, name: &str) -> usize {
        self.tasks
            .lock()
            .unwrap()
            .get(name)
            .map(|s| s.reads)
            .unwrap_or(0)
    }

    pub fn created(&self) -> Vec<TaskExecution> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionStore for FakeStore {
    async fn get_pipeline_execution(&self, name: &str, namespace: &str) -> Result<PipelineExecution> {
        self.pipelines
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("pipelinerun {}/{}", namespace, name)))
    }

    async fn get_task_execution(&self, name: &str, namespace: &str) -> Result<TaskExecution> {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.get_mut(name).and_then(Script::next) {
            Some(Step::Ready(task)) => Ok(task),
            Some(Step::Unavailable) => Err(ClientError::api_error(503, "store unavailable")),
            None => Err(ClientError::NotFound(format!("taskrun {}/{}", namespace, name))),
        }
    }

    async fn create_task_execution(
        &self,
        task: &TaskExecution,
        namespace: &str,
    ) -> Result<TaskExecution> {
        if *self.reject_create.lock().unwrap() {
            return Err(ClientError::api_error(409, "taskrun already exists"));
        }

        let mut created = task.clone();
        created.metadata.namespace = namespace.to_string();
        self.created.lock().unwrap().push(created.clone());

        let steps = self
            .create_script
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| vec![Step::Ready(created.clone())]);
        self.tasks.lock().unwrap().insert(
            created.metadata.name.clone(),
            Script { steps, reads: 0 },
        );
        Ok(created)
    }

    async fn delete_task_executions(&self, _namespace: &str) -> Result<()> {
        self.tasks.lock().unwrap().clear();
        Ok(())
    }

    async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod> {
        self.pods
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("pod {}/{}", namespace, name)))
    }

    async fn get_container_log(
        &self,
        pod_name: &str,
        container: &str,
        _namespace: &str,
    ) -> Result<String> {
        match self
            .logs
            .lock()
            .unwrap()
            .get(&(pod_name.to_string(), container.to_string()))
        {
            Some(Some(text)) => Ok(text.clone()),
            _ => Err(ClientError::api_error(500, "container log unavailable")),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub const NAMESPACE: &str = "dev";

pub fn pipeline(name: &str, children: &[(&str, &str)]) -> PipelineExecution {
    let mut run = PipelineExecution::default();
    run.metadata.name = name.to_string();
    run.metadata.namespace = NAMESPACE.to_string();
    run.status.child_references = children
        .iter()
        .map(|(task, child)| ChildReference::task_run(*task, *child))
        .collect();
    run
}

pub fn running_task(name: &str) -> TaskExecution {
    let mut task = TaskExecution::new(name, NAMESPACE);
    task.status.conditions =
        vec![Condition::new(SUCCEEDED, ConditionStatus::Unknown).with_reason("Running")];
    task
}

pub fn succeeded_task(name: &str) -> TaskExecution {
    let mut task = TaskExecution::new(name, NAMESPACE);
    task.status.completion_time = Some(Utc::now());
    task.status.conditions =
        vec![Condition::new(SUCCEEDED, ConditionStatus::True).with_reason("Succeeded")];
    task
}

pub fn failed_task(name: &str) -> TaskExecution {
    let mut task = TaskExecution::new(name, NAMESPACE);
    task.status.completion_time = Some(Utc::now());
    task.status.conditions =
        vec![Condition::new(SUCCEEDED, ConditionStatus::False).with_reason("Failed")];
    task
}
