//! Samples configured metrics into the custom properties of a build.

use std::collections::BTreeMap;

use tracing::debug;

use crate::metrics::{Metric, MetricTarget, MetricsContext};
use crate::report::CustomProperties;

pub struct MetricsProvider;

impl MetricsProvider {
    /// Run each metric once. Later metrics with the same name overwrite earlier ones.
    pub fn collect(metrics: &[Box<dyn Metric>], ctx: &MetricsContext) -> CustomProperties {
        let mut build_properties = BTreeMap::new();
        let mut task_properties = BTreeMap::new();
        for metric in metrics {
            let Some(value) = metric.collect(ctx) else {
                debug!(metric = metric.name(), "Metric unavailable");
                continue;
            };
            let target = match metric.target() {
                MetricTarget::Build => &mut build_properties,
                MetricTarget::Task => &mut task_properties,
            };
            target.insert(metric.name().to_string(), value);
        }
        CustomProperties::new(build_properties, task_properties)
    }
}
