//! Filter pipeline: a task filter that prunes records and a build filter that may veto
//! publishing altogether.
//!
//! Filters are total. A configuration that cannot be compiled degrades to the identity
//! filter with a warning instead of failing the build.

pub mod build;
pub mod configuration;
pub mod pattern;
pub mod task;

pub use build::{BuildFilter, BuildFilterDecision};
pub use configuration::{
    BuildFilterConfiguration, FilterConfiguration, StateFilterConfiguration,
    StringFilterConfiguration, TaskFilterConfiguration, ThresholdConfiguration,
};
pub use task::TaskFilter;

use tracing::info;

use crate::report::ExecutionReport;

/// Result of running a report through the filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Publish(ExecutionReport),
    Suppressed { reason: String },
}

/// Task filter followed by build filter.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    task: TaskFilter,
    build: BuildFilter,
}

impl FilterPipeline {
    pub fn new(task: TaskFilter, build: BuildFilter) -> Self {
        Self { task, build }
    }

    pub fn from_config(config: &FilterConfiguration) -> Self {
        Self {
            task: TaskFilter::new(config.task.as_ref()),
            build: BuildFilter::new(config.build.as_ref()),
        }
    }

    pub fn run(&self, report: ExecutionReport) -> FilterOutcome {
        let before = report.tasks.len();
        let report = self.task.apply(report);
        if report.tasks.len() != before {
            info!(
                kept = report.tasks.len(),
                removed = before - report.tasks.len(),
                "Task filter applied"
            );
        }

        match self.build.evaluate(&report) {
            BuildFilterDecision::Publish => FilterOutcome::Publish(report),
            BuildFilterDecision::Suppress(reason) => {
                info!(reason = %reason, "Build filtered out; publishing suppressed");
                FilterOutcome::Suppressed { reason }
            }
        }
    }
}
