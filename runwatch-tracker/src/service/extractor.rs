//! Result extractor
//!
//! Typed getters over a task run snapshot. Results and step env vars come
//! from script output and may end in a single `\n`, which is dropped. Params
//! are caller-supplied and are trimmed on both ends instead.

use runwatch_core::domain::pipeline::PipelineExecution;
use runwatch_core::domain::task::TaskExecution;
use runwatch_core::dto::status::PipelineTaskStatus;

use super::resolver::ChildResolver;
use crate::error::{Result, TrackError};

fn strip_newline(value: &str) -> &str {
    value.strip_suffix('\n').unwrap_or(value)
}

/// Value of result `name`, without its trailing newline
pub fn get_result(task: &TaskExecution, name: &str) -> Result<String> {
    task.status
        .results
        .iter()
        .find(|r| r.name == name)
        .map(|r| strip_newline(r.value.as_str()).to_string())
        .ok_or_else(|| {
            TrackError::not_found(format!("result {:?} not found in TaskRun {}", name, task.metadata))
        })
}

/// Value of param `name`, trimmed of surrounding whitespace
pub fn get_param(task: &TaskExecution, name: &str) -> Result<String> {
    task.spec
        .params
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.value.as_str().trim().to_string())
        .ok_or_else(|| {
            TrackError::not_found(format!("param {:?} not found in TaskRun {}", name, task.metadata))
        })
}

/// Value of step template env var `name`, without its trailing newline
///
/// # Errors
/// - `MissingField` if the run has no resolved task spec
/// - `NotFound` if the env var is not set on the step template
pub fn get_env(task: &TaskExecution, name: &str) -> Result<String> {
    let env = task
        .step_env()
        .ok_or_else(|| TrackError::missing_field(format!("TaskRun {}", task.metadata), "status.taskSpec"))?;

    env.iter()
        .find(|e| e.name == name)
        .map(|e| strip_newline(&e.value).to_string())
        .ok_or_else(|| {
            TrackError::not_found(format!("env var {:?} not found in TaskRun {}", name, task.metadata))
        })
}

/// Getters that first resolve a logical task of a pipeline execution
#[derive(Clone)]
pub struct ResultExtractor {
    resolver: ChildResolver,
}

impl ResultExtractor {
    pub fn new(resolver: ChildResolver) -> Self {
        Self { resolver }
    }

    /// Result `result` of the task run behind `pipeline_task_name`
    pub async fn get_result_for_task(
        &self,
        parent: &PipelineExecution,
        pipeline_task_name: &str,
        result: &str,
    ) -> Result<String> {
        let task = self.resolver.resolve(parent, pipeline_task_name).await?;
        get_result(&task, result).map_err(|_| {
            TrackError::not_found(format!(
                "result {:?} not found in TaskRuns of PipelineRun {}",
                result, parent.metadata
            ))
        })
    }

    /// Param `param` of the task run behind `pipeline_task_name`
    pub async fn get_param_for_task(
        &self,
        parent: &PipelineExecution,
        pipeline_task_name: &str,
        param: &str,
    ) -> Result<String> {
        let task = self.resolver.resolve(parent, pipeline_task_name).await?;
        get_param(&task, param)
    }

    /// Full status of the task run behind `pipeline_task_name`
    pub async fn get_status_for_task(
        &self,
        parent: &PipelineExecution,
        pipeline_task_name: &str,
    ) -> Result<PipelineTaskStatus> {
        let task = self.resolver.resolve(parent, pipeline_task_name).await.map_err(|e| match e {
            TrackError::NotFound(_) => TrackError::not_found(format!(
                "TaskRun status for pipeline task name {:?} not found in the status of PipelineRun {}",
                pipeline_task_name, parent.metadata
            )),
            other => other,
        })?;

        Ok(PipelineTaskStatus {
            pipeline_task_name: pipeline_task_name.to_string(),
            status: task.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, pipeline, succeeded_task};
    use runwatch_core::domain::condition::ExecutionState;
    use runwatch_core::domain::task::{EnvVar, Param, StepTemplate, TaskResult, TaskSpec};
    use std::sync::Arc;

    fn task_with_results(results: &[(&str, &str)]) -> TaskExecution {
        let mut task = succeeded_task("push-1");
        task.status.results = results
            .iter()
            .map(|(name, value)| TaskResult::string(*name, *value))
            .collect();
        task
    }

    fn task_with_env(env: &[(&str, &str)]) -> TaskExecution {
        let mut task = succeeded_task("push-1");
        task.status.task_spec = Some(TaskSpec {
            step_template: Some(StepTemplate {
                env: env.iter().map(|(n, v)| EnvVar::new(*n, *v)).collect(),
            }),
        });
        task
    }

    #[test]
    fn test_get_result_strips_one_newline() {
        let task = task_with_results(&[("IMAGE_URL", "quay.io/x@sha256:abc\n")]);
        assert_eq!(get_result(&task, "IMAGE_URL").unwrap(), "quay.io/x@sha256:abc");

        let task = task_with_results(&[("IMAGE_URL", " quay.io/x \n\n")]);
        assert_eq!(get_result(&task, "IMAGE_URL").unwrap(), " quay.io/x \n");
    }

    #[test]
    fn test_get_result_first_match_and_missing() {
        let task = task_with_results(&[("DIGEST", "one"), ("DIGEST", "two")]);
        assert_eq!(get_result(&task, "DIGEST").unwrap(), "one");

        let err = get_result(&task, "IMAGE_URL").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "result \"IMAGE_URL\" not found in TaskRun dev/push-1");
    }

    #[test]
    fn test_get_param_trims_both_ends() {
        let mut task = succeeded_task("copy-1");
        task.spec.params = vec![
            Param::string("srcImageURL", "  foo  "),
            Param::string("destImageURL", "\tbar\n"),
        ];
        assert_eq!(get_param(&task, "srcImageURL").unwrap(), "foo");
        assert_eq!(get_param(&task, "destImageURL").unwrap(), "bar");
        assert!(get_param(&task, "missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_env_without_task_spec_is_missing_field() {
        let task = succeeded_task("push-1");
        let err = get_env(&task, "X").unwrap_err();
        assert!(matches!(err, TrackError::MissingField { field: "status.taskSpec", .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_get_env_strips_one_newline() {
        let task = task_with_env(&[("X", "  value\n")]);
        assert_eq!(get_env(&task, "X").unwrap(), "  value");
        assert!(get_env(&task, "Y").unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_env_without_step_template_is_not_found() {
        let mut task = succeeded_task("push-1");
        task.status.task_spec = Some(TaskSpec::default());
        assert!(get_env(&task, "X").unwrap_err().is_not_found());
    }

    fn extractor(task: TaskExecution) -> ResultExtractor {
        let store = FakeStore::new().with_task(task);
        ResultExtractor::new(ChildResolver::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_get_result_for_task() {
        let extractor = extractor(task_with_results(&[("IMAGE_DIGEST", "sha256:abc\n")]));
        let parent = pipeline("pr", &[("push", "push-1")]);

        let digest = extractor
            .get_result_for_task(&parent, "push", "IMAGE_DIGEST")
            .await
            .unwrap();
        assert_eq!(digest, "sha256:abc");

        let err = extractor
            .get_result_for_task(&parent, "push", "IMAGE_URL")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "result \"IMAGE_URL\" not found in TaskRuns of PipelineRun dev/pr"
        );

        let err = extractor
            .get_result_for_task(&parent, "build", "IMAGE_DIGEST")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_param_for_task() {
        let mut task = succeeded_task("push-1");
        task.spec.params = vec![Param::string("IMAGE", " quay.io/org/app ")];
        let extractor = extractor(task);
        let parent = pipeline("pr", &[("push", "push-1")]);

        let image = extractor.get_param_for_task(&parent, "push", "IMAGE").await.unwrap();
        assert_eq!(image, "quay.io/org/app");
    }

    #[tokio::test]
    async fn test_get_status_for_task() {
        let extractor = extractor(succeeded_task("push-1"));
        let parent = pipeline("pr", &[("push", "push-1")]);

        let report = extractor.get_status_for_task(&parent, "push").await.unwrap();
        assert_eq!(report.pipeline_task_name, "push");
        assert!(report.status.completion_time.is_some());
        assert_eq!(report.state(), ExecutionState::Succeeded);

        let err = extractor.get_status_for_task(&parent, "build").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
