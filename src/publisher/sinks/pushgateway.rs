//! Push-gateway sink: gauges in Prometheus text exposition format, one push per job.

use std::collections::BTreeMap;

use async_trait::async_trait;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use reqwest::Client;
use tracing::debug;

use crate::error::PublishError;
use crate::publisher::configuration::{
    PublishScope, PublisherKind, PushGatewayPublisherConfiguration,
};
use crate::publisher::sink::Sink;
use crate::publisher::sinks::http::{build_sink_http_client, join_url, send_checked};
use crate::report::ExecutionReport;

const TASK_LABELS: [&str; 5] = ["task", "path", "module", "state", "requested"];

pub struct PushGatewaySink {
    config: PushGatewayPublisherConfiguration,
    scope: PublishScope,
    client: Client,
}

impl PushGatewaySink {
    pub fn new(
        config: PushGatewayPublisherConfiguration,
        scope: PublishScope,
    ) -> Result<Self, PublishError> {
        let scope = scope.restrict(config.publish_build_metrics, config.publish_task_metrics);
        Ok(Self {
            client: build_sink_http_client(PublisherKind::PushGateway)?,
            config,
            scope,
        })
    }

    /// Task gauges for `report`, or `None` when there is nothing to push.
    pub fn encode_tasks(&self, report: &ExecutionReport) -> Result<Option<String>, PublishError> {
        if !self.scope.tasks || report.tasks.is_empty() {
            return Ok(None);
        }
        let extra = property_labels(&report.custom_properties.task_properties, &TASK_LABELS);
        let mut labels: Vec<&str> = TASK_LABELS.to_vec();
        labels.extend(extra.iter().map(|(name, _)| name.as_str()));

        let registry = Registry::new();
        let gauge = GaugeVec::new(
            Opts::new("task_duration_ms", "Task execution time in milliseconds"),
            &labels,
        )?;
        registry.register(Box::new(gauge.clone()))?;

        for task in &report.tasks {
            let requested = task.is_requested.to_string();
            let mut values: Vec<&str> = vec![
                task.name.as_str(),
                task.path.as_str(),
                task.module.as_str(),
                task.state.as_str(),
                requested.as_str(),
            ];
            values.extend(extra.iter().map(|(_, value)| value.as_str()));
            gauge.with_label_values(&values).set(task.duration_ms as f64);
        }
        encode(&registry).map(Some)
    }

    /// Build gauges for `report`, or `None` when build metrics are out of scope.
    pub fn encode_build(&self, report: &ExecutionReport) -> Result<Option<String>, PublishError> {
        if !self.scope.build {
            return Ok(None);
        }
        let reserved: &[&str] = if report.build_id.is_some() { &["build_id"] } else { &[] };
        let mut extra = property_labels(&report.custom_properties.build_properties, reserved);
        if let Some(build_id) = &report.build_id {
            extra.insert(0, ("build_id".to_string(), build_id.clone()));
        }
        let labels: Vec<&str> = extra.iter().map(|(name, _)| name.as_str()).collect();
        let values: Vec<&str> = extra.iter().map(|(_, value)| value.as_str()).collect();

        let registry = Registry::new();
        for (name, help, value) in [
            (
                "build_duration_ms",
                "Build execution time in milliseconds",
                report.duration_ms as f64,
            ),
            (
                "build_configuration_duration_ms",
                "Configuration phase time in milliseconds",
                report.configuration_duration_ms as f64,
            ),
            (
                "build_success",
                "1 when no task failed",
                if report.success { 1.0 } else { 0.0 },
            ),
        ] {
            let gauge = GaugeVec::new(Opts::new(name, help), &labels)?;
            registry.register(Box::new(gauge.clone()))?;
            gauge.with_label_values(&values).set(value);
        }
        encode(&registry).map(Some)
    }

    async fn push(&self, job: &str, body: String) -> Result<(), PublishError> {
        let request = self
            .client
            .put(join_url(&self.config.url, &["metrics", "job", job]))
            .header(
                reqwest::header::CONTENT_TYPE,
                TextEncoder::new().format_type(),
            )
            .body(body);
        send_checked(self.kind(), request).await?;
        debug!(publisher = %self.kind(), job = %job, "Metrics pushed");
        Ok(())
    }
}

#[async_trait]
impl Sink for PushGatewaySink {
    fn kind(&self) -> PublisherKind {
        PublisherKind::PushGateway
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        if let Some(body) = self.encode_tasks(report)? {
            self.push(&self.config.task_job_name, body).await?;
        }
        if let Some(body) = self.encode_build(report)? {
            self.push(&self.config.build_job_name, body).await?;
        }
        Ok(())
    }
}

fn encode(registry: &Registry) -> Result<String, PublishError> {
    Ok(TextEncoder::new().encode_to_string(&registry.gather())?)
}

/// Custom properties as label pairs, with names sanitized and clashes with `reserved` dropped.
fn property_labels(
    properties: &BTreeMap<String, String>,
    reserved: &[&str],
) -> Vec<(String, String)> {
    let mut labels: Vec<(String, String)> = Vec::new();
    for (key, value) in properties {
        let name = sanitize_label(key);
        if reserved.contains(&name.as_str()) || labels.iter().any(|(n, _)| *n == name) {
            continue;
        }
        labels.push((name, value.clone()));
    }
    labels
}

fn sanitize_label(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    while name.starts_with("__") {
        name.remove(0);
    }
    name
}
