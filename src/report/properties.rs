//! Custom build/task properties contributed by metric providers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key-unique build-level and task-level properties.
///
/// Populated once when the build service is configured; read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProperties {
    #[serde(default)]
    pub build_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub task_properties: BTreeMap<String, String>,
}

impl CustomProperties {
    pub fn new(
        build_properties: BTreeMap<String, String>,
        task_properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            build_properties,
            task_properties,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.build_properties.is_empty() && self.task_properties.is_empty()
    }
}
