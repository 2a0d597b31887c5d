//! Filter configuration option bags.

use serde::{Deserialize, Serialize};

use crate::report::TaskState;

/// Regex patterns; each pattern must match the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringFilterConfiguration {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl StringFilterConfiguration {
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFilterConfiguration {
    #[serde(default)]
    pub includes: Vec<TaskState>,
    #[serde(default)]
    pub excludes: Vec<TaskState>,
}

/// Inclusive execution-time bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfiguration {
    #[serde(default)]
    pub min_execution_time_ms: Option<u64>,
    #[serde(default)]
    pub max_execution_time_ms: Option<u64>,
}

/// Predicates over task name/path, module, state and duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilterConfiguration {
    /// Matched against both the task name and its full path.
    #[serde(default)]
    pub names: StringFilterConfiguration,
    #[serde(default)]
    pub modules: StringFilterConfiguration,
    #[serde(default)]
    pub states: StateFilterConfiguration,
    #[serde(default)]
    pub threshold: Option<ThresholdConfiguration>,
}

/// Predicates over report-level fields. Any failing predicate vetoes publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFilterConfiguration {
    /// Publish only builds with this outcome.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub requested_tasks: StringFilterConfiguration,
    #[serde(default)]
    pub min_duration_ms: Option<u64>,
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfiguration {
    #[serde(default)]
    pub task: Option<TaskFilterConfiguration>,
    #[serde(default)]
    pub build: Option<BuildFilterConfiguration>,
}
