//! The execution report: the unit of publication.

use serde::{Deserialize, Serialize};

use crate::report::properties::CustomProperties;
use crate::report::task::TaskRecord;

/// Consolidated report of one build. Immutable once assembled by the build service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,
    pub configuration_duration_ms: u64,
    pub success: bool,
    pub configuration_cache_hit: bool,
    #[serde(default)]
    pub custom_properties: CustomProperties,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub requested_tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
}

impl Default for ExecutionReport {
    fn default() -> Self {
        Self {
            start_ms: 0,
            end_ms: 0,
            duration_ms: 0,
            configuration_duration_ms: 0,
            success: true,
            configuration_cache_hit: false,
            custom_properties: CustomProperties::default(),
            tasks: Vec::new(),
            requested_tasks: Vec::new(),
            build_id: None,
        }
    }
}

impl ExecutionReport {
    /// A build succeeds iff none of its tasks failed.
    pub fn success_of(tasks: &[TaskRecord]) -> bool {
        !tasks.iter().any(TaskRecord::is_failed)
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|t| t.is_failed())
    }

    /// Tasks sorted by duration, longest first.
    pub fn slowest_tasks(&self) -> Vec<&TaskRecord> {
        let mut tasks: Vec<&TaskRecord> = self.tasks.iter().collect();
        tasks.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
        tasks
    }
}
