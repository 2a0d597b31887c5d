//! Metric providers: named values sampled once per build and attached to the report as
//! custom build or task properties.

pub mod catalog;
pub mod configuration;
pub mod provider;

pub use catalog::SimpleMetric;
pub use configuration::MetricsConfiguration;
pub use provider::MetricsProvider;

use std::path::PathBuf;

/// Which property map a metric's value lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricTarget {
    Build,
    Task,
}

/// Build facts a metric may read.
#[derive(Debug, Clone, Default)]
pub struct MetricsContext {
    pub root_project_name: Option<String>,
    pub requested_tasks: Vec<String>,
    pub tool_version: String,
    pub workspace_root: PathBuf,
}

impl MetricsContext {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Self::default()
        }
    }
}

pub trait Metric: Send + Sync {
    fn name(&self) -> &str;

    fn target(&self) -> MetricTarget {
        MetricTarget::Build
    }

    /// Sample the value. `None` means the metric is unavailable and is left out.
    fn collect(&self, ctx: &MetricsContext) -> Option<String>;
}
