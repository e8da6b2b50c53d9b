use crate::filter::FilterParams;
use serde::{Deserialize, Serialize};

/// Name of the built-in profile that strips container-orchestration chains
pub const CONTAINER_DEFAULTS: &str = "container-defaults";

/// A named, reusable set of filter parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub params: FilterParams,
}

impl FilterProfile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Docker and Kubernetes chains removed from the filter table
    pub fn container_defaults() -> Self {
        Self {
            name: CONTAINER_DEFAULTS.to_string(),
            description: "Strip Docker and Kubernetes chains from the filter table".to_string(),
            params: FilterParams::new()
                .with_tables(["filter"])
                .with_exclude(["DOCKER", "KUBE"]),
        }
    }
}

/// Profiles that exist without any profile files on disk
pub fn builtin_profiles() -> Vec<FilterProfile> {
    vec![FilterProfile::container_defaults()]
}
