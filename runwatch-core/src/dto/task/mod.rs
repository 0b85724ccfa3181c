//! Task execution requests

use serde::{Deserialize, Serialize};

use crate::domain::meta::ObjectMeta;
use crate::domain::task::{
    EmptyDir, Param, PodSecurityContext, PodTemplate, TaskExecution, TaskExecutionSpec, TaskRef,
    WorkspaceBinding,
};

/// Cluster task that copies an image between repositories
pub const IMAGE_COPY_TASK: &str = "skopeo-copy";

/// Non-root user the copy task runs as
pub const IMAGE_COPY_USER: i64 = 65532;

/// Request to copy one image to a second repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCopyRequest {
    pub name: String,
    pub namespace: String,
    pub service_account: String,
    pub src_image_url: String,
    pub dest_image_url: String,
}

impl ImageCopyRequest {
    /// Builds the task execution that performs the copy
    ///
    /// The pod runs as a fixed non-root user: the copy image would otherwise
    /// be rejected by `runAsNonRoot` admission.
    pub fn into_task_execution(self) -> TaskExecution {
        TaskExecution {
            metadata: ObjectMeta::new(self.name, self.namespace),
            spec: TaskExecutionSpec {
                service_account_name: Some(self.service_account),
                task_ref: Some(TaskRef {
                    name: IMAGE_COPY_TASK.to_string(),
                    kind: "ClusterTask".to_string(),
                }),
                params: vec![
                    Param::string("srcImageURL", self.src_image_url),
                    Param::string("destImageURL", self.dest_image_url),
                ],
                pod_template: Some(PodTemplate {
                    security_context: Some(PodSecurityContext {
                        run_as_non_root: Some(true),
                        run_as_user: Some(IMAGE_COPY_USER),
                    }),
                }),
                workspaces: vec![WorkspaceBinding {
                    name: "images-url".to_string(),
                    empty_dir: Some(EmptyDir {}),
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
