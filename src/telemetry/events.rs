//! Event schema for host notifications.

use serde::{Deserialize, Serialize};

/// One task-completion notification as delivered by the host build tool.
///
/// `display_name` is the host's human-readable outcome line, e.g. `"Task :app:compile UP-TO-DATE"`.
/// Timestamps are optional because some hosts omit them for skipped work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFinishEvent {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub display_name: String,
}

impl TaskFinishEvent {
    pub fn new(
        path: impl Into<String>,
        start_ms: Option<u64>,
        end_ms: Option<u64>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            start_ms,
            end_ms,
            display_name: display_name.into(),
        }
    }

    /// The outcome token of the display line (third space-separated word), if present.
    pub fn state_token(&self) -> Option<&str> {
        self.display_name.split(' ').nth(2)
    }
}

/// A recorded build: the host inputs of one build plus its notifications in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTranscript {
    pub start_ms: u64,
    #[serde(default)]
    pub requested_tasks: Vec<String>,
    #[serde(default = "default_true")]
    pub configuration_phase_executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_project_name: Option<String>,
    /// When the host reported the build finished; otherwise the latest recorded timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub events: Vec<TaskFinishEvent>,
}

impl BuildTranscript {
    /// Recorded end of the build, never before its start.
    pub fn finished_ms(&self) -> u64 {
        self.end_ms.unwrap_or_else(|| {
            self.events
                .iter()
                .flat_map(|event| [event.start_ms, event.end_ms])
                .flatten()
                .fold(self.start_ms, u64::max)
        })
        .max(self.start_ms)
    }
}

fn default_true() -> bool {
    true
}
