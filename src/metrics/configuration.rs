use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::catalog::{SimpleMetric, DEFAULT_METRICS, ENVIRONMENT_METRICS, GIT_METRICS};
use crate::metrics::{Metric, MetricTarget};
use crate::telemetry::new_build_id;

fn default_true() -> bool {
    true
}

/// Metric group toggles and user-declared values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfiguration {
    #[serde(default = "default_true")]
    pub default_metrics: bool,
    #[serde(default = "default_true")]
    pub environment_metrics: bool,
    #[serde(default = "default_true")]
    pub git_metrics: bool,
    #[serde(default)]
    pub generate_build_id: bool,
    #[serde(default)]
    pub custom_build_metrics: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_task_metrics: BTreeMap<String, String>,
}

impl Default for MetricsConfiguration {
    fn default() -> Self {
        Self {
            default_metrics: true,
            environment_metrics: true,
            git_metrics: true,
            generate_build_id: false,
            custom_build_metrics: BTreeMap::new(),
            custom_task_metrics: BTreeMap::new(),
        }
    }
}

impl MetricsConfiguration {
    /// All groups off, no custom metrics.
    pub fn none() -> Self {
        Self {
            default_metrics: false,
            environment_metrics: false,
            git_metrics: false,
            ..Self::default()
        }
    }

    pub fn build(&self) -> Vec<Box<dyn Metric>> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::new();
        let groups = [
            (self.default_metrics, &DEFAULT_METRICS[..]),
            (self.environment_metrics, &ENVIRONMENT_METRICS[..]),
            (self.git_metrics, &GIT_METRICS[..]),
        ];
        for (enabled, group) in groups {
            if enabled {
                metrics.extend(group.iter().map(|m| Box::new(*m) as Box<dyn Metric>));
            }
        }
        for (name, value) in &self.custom_build_metrics {
            metrics.push(Box::new(SimpleMetric::new(name, value, MetricTarget::Build)));
        }
        for (name, value) in &self.custom_task_metrics {
            metrics.push(Box::new(SimpleMetric::new(name, value, MetricTarget::Task)));
        }
        metrics
    }

    /// A fresh build id when generation is enabled.
    pub fn build_id(&self) -> Option<String> {
        self.generate_build_id.then(new_build_id)
    }
}
