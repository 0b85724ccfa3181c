//! Pod backing a task execution

use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub image: String,
}

impl Pod {
    /// Container names in declaration order
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.spec.containers.iter().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_names_keep_order() {
        let pod: Pod = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "build-pod", "namespace": "dev" },
            "spec": {
                "containers": [
                    { "name": "step-build", "image": "quay.io/buildah" },
                    { "name": "step-push", "image": "quay.io/skopeo" }
                ],
                "restartPolicy": "Never"
            }
        }))
        .unwrap();

        let names: Vec<_> = pod.container_names().collect();
        assert_eq!(names, vec!["step-build", "step-push"]);
    }
}
