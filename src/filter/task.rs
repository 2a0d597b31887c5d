//! Task filter: prunes task records that do not match the configured predicates.

use std::collections::HashSet;

use tracing::warn;

use crate::error::FilterConfigurationError;
use crate::filter::configuration::TaskFilterConfiguration;
use crate::filter::pattern::IncludeExclude;
use crate::report::{ExecutionReport, TaskRecord, TaskState};

#[derive(Debug, Clone)]
struct CompiledTaskFilter {
    names: IncludeExclude,
    modules: IncludeExclude,
    state_includes: HashSet<TaskState>,
    state_excludes: HashSet<TaskState>,
    min_ms: Option<u64>,
    max_ms: Option<u64>,
}

impl CompiledTaskFilter {
    fn compile(config: &TaskFilterConfiguration) -> Result<Self, FilterConfigurationError> {
        let (min_ms, max_ms) = config
            .threshold
            .as_ref()
            .map(|t| (t.min_execution_time_ms, t.max_execution_time_ms))
            .unwrap_or((None, None));
        if let (Some(min_ms), Some(max_ms)) = (min_ms, max_ms) {
            if min_ms > max_ms {
                return Err(FilterConfigurationError::ContradictoryThreshold { min_ms, max_ms });
            }
        }

        Ok(Self {
            names: IncludeExclude::compile(&config.names)?,
            modules: IncludeExclude::compile(&config.modules)?,
            state_includes: config.states.includes.iter().copied().collect(),
            state_excludes: config.states.excludes.iter().copied().collect(),
            min_ms,
            max_ms,
        })
    }

    fn accepts(&self, task: &TaskRecord) -> bool {
        let state_accepted = !self.state_excludes.contains(&task.state)
            && (self.state_includes.is_empty() || self.state_includes.contains(&task.state));
        let threshold_accepted = self.min_ms.map_or(true, |min| task.duration_ms >= min)
            && self.max_ms.map_or(true, |max| task.duration_ms <= max);

        state_accepted
            && threshold_accepted
            && self.names.accepts([task.name.as_str(), task.path.as_str()])
            && self.modules.accepts([task.module.as_str()])
    }
}

/// Removes non-matching records from a report. Without configuration it is the identity.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    compiled: Option<CompiledTaskFilter>,
}

impl TaskFilter {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build a filter, degrading to identity with a warning when the configuration is invalid.
    pub fn new(config: Option<&TaskFilterConfiguration>) -> Self {
        match config.map(Self::try_new) {
            None => Self::identity(),
            Some(Ok(filter)) => filter,
            Some(Err(err)) => {
                warn!(error = %err, "Invalid task filter configuration; task filtering disabled");
                Self::identity()
            }
        }
    }

    pub fn try_new(config: &TaskFilterConfiguration) -> Result<Self, FilterConfigurationError> {
        Ok(Self {
            compiled: Some(CompiledTaskFilter::compile(config)?),
        })
    }

    pub fn is_identity(&self) -> bool {
        self.compiled.is_none()
    }

    pub fn accepts(&self, task: &TaskRecord) -> bool {
        self.compiled.as_ref().map_or(true, |f| f.accepts(task))
    }

    pub fn apply(&self, mut report: ExecutionReport) -> ExecutionReport {
        if let Some(filter) = &self.compiled {
            report.tasks.retain(|task| filter.accepts(task));
        }
        report
    }
}
