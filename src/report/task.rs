//! Task records and the builder that normalizes host notifications into them.

use serde::{Deserialize, Serialize};

use crate::telemetry::{now_millis, TaskFinishEvent};

/// Module value for tasks that live directly under the root project.
pub const NO_MODULE: &str = "no_module";

/// Outcome of one task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Executed,
    UpToDate,
    FromCache,
    NoSource,
    Skipped,
    Failed,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Executed => "EXECUTED",
            TaskState::UpToDate => "UP_TO_DATE",
            TaskState::FromCache => "FROM_CACHE",
            TaskState::NoSource => "NO_SOURCE",
            TaskState::Skipped => "SKIPPED",
            TaskState::Failed => "FAILED",
        }
    }

    /// Map the host's display vocabulary to a state. Unknown tokens count as executed.
    pub fn from_display_token(token: Option<&str>) -> Self {
        match token {
            Some("UP-TO-DATE") => TaskState::UpToDate,
            Some("FROM-CACHE") => TaskState::FromCache,
            Some("NO-SOURCE") => TaskState::NoSource,
            Some("skipped") => TaskState::Skipped,
            Some("failed") => TaskState::Failed,
            _ => TaskState::Executed,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed task execution. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub duration_ms: u64,
    pub name: String,
    pub path: String,
    pub state: TaskState,
    pub is_requested: bool,
    pub module: String,
    pub start_ms: u64,
    pub stop_ms: u64,
}

impl TaskRecord {
    pub fn is_failed(&self) -> bool {
        self.state == TaskState::Failed
    }
}

/// Group a task path by module: everything but the last segment when the path has
/// more than two colon-delimited segments, `no_module` otherwise.
pub fn derive_module(path: &str) -> String {
    let segments: Vec<&str> = path.split(':').collect();
    if segments.len() > 2 {
        segments[..segments.len() - 1].join(":")
    } else {
        NO_MODULE.to_string()
    }
}

/// Build a [`TaskRecord`] from a host notification.
///
/// Total: missing timestamps default to the call time and an end before the start yields a
/// zero-length record.
pub fn task_record(event: &TaskFinishEvent, requested_tasks: &[String]) -> TaskRecord {
    task_record_at(event, requested_tasks, now_millis())
}

/// [`task_record`] with missing timestamps filled from `now`.
pub fn task_record_at(event: &TaskFinishEvent, requested_tasks: &[String], now: u64) -> TaskRecord {
    let start_ms = event.start_ms.unwrap_or(now);
    let end_ms = event.end_ms.unwrap_or(now);
    let duration_ms = end_ms.saturating_sub(start_ms);

    let name = event
        .path
        .rsplit_once(':')
        .map(|(_, name)| name)
        .unwrap_or(event.path.as_str())
        .to_string();
    let is_requested = requested_tasks.iter().any(|requested| *requested == name);

    TaskRecord {
        duration_ms,
        module: derive_module(&event.path),
        path: event.path.clone(),
        state: TaskState::from_display_token(event.state_token()),
        is_requested,
        name,
        start_ms,
        stop_ms: start_ms + duration_ms,
    }
}
