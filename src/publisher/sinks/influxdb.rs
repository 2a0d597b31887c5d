//! Time-series sink writing InfluxDB 1.x line protocol.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::PublishError;
use crate::publisher::configuration::{
    InfluxDbPublisherConfiguration, PublishScope, PublisherKind,
};
use crate::publisher::sink::Sink;
use crate::publisher::sinks::http::{build_sink_http_client, join_url, send_checked};
use crate::report::{ExecutionReport, TaskRecord};

pub struct InfluxDbSink {
    config: InfluxDbPublisherConfiguration,
    scope: PublishScope,
    client: Client,
}

impl InfluxDbSink {
    pub fn new(
        config: InfluxDbPublisherConfiguration,
        scope: PublishScope,
    ) -> Result<Self, PublishError> {
        let scope = scope.restrict(config.publish_build_metrics, config.publish_task_metrics);
        Ok(Self {
            client: build_sink_http_client(PublisherKind::InfluxDb)?,
            config,
            scope,
        })
    }

    /// Points for this sink's scope: task points first, then the build point.
    pub fn encode(&self, report: &ExecutionReport) -> Vec<String> {
        let mut lines = Vec::new();
        if self.scope.tasks {
            lines.extend(report.tasks.iter().map(|task| self.task_line(task, report)));
        }
        if self.scope.build {
            lines.push(self.build_line(report));
        }
        lines
    }

    fn build_line(&self, report: &ExecutionReport) -> String {
        let mut tags: Vec<(&str, &str)> = Vec::new();
        if let Some(build_id) = &report.build_id {
            tags.push(("buildId", build_id));
        }
        tags.extend(
            report
                .custom_properties
                .build_properties
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        let mut fields = vec![
            format!("duration={}", float(report.duration_ms)),
            format!("configuration={}", float(report.configuration_duration_ms)),
            format!("success={}", report.success),
        ];
        if report.configuration_cache_hit {
            fields.push("configurationCacheHit=true".to_string());
        }
        if !report.requested_tasks.is_empty() {
            fields.push(format!(
                "requestedTasks={}",
                string_field(&report.requested_tasks.join(" "))
            ));
        }

        format!(
            "{}{} {} {}",
            escape_measurement(&self.config.build_metric_name),
            tag_set(&tags),
            fields.join(","),
            report.end_ms
        )
    }

    fn task_line(&self, task: &TaskRecord, report: &ExecutionReport) -> String {
        let requested = task.is_requested.to_string();
        let mut tags: Vec<(&str, &str)> = vec![
            ("module", task.module.as_str()),
            ("rootNode", requested.as_str()),
            ("state", task.state.as_str()),
            ("task", task.path.as_str()),
        ];
        if let Some(build_id) = &report.build_id {
            tags.push(("buildId", build_id));
        }
        tags.extend(
            report
                .custom_properties
                .task_properties
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        format!(
            "{}{} value={}i {}",
            escape_measurement(&self.config.task_metric_name),
            tag_set(&tags),
            task.duration_ms,
            task.stop_ms
        )
    }
}

#[async_trait]
impl Sink for InfluxDbSink {
    fn kind(&self) -> PublisherKind {
        PublisherKind::InfluxDb
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        let lines = self.encode(report);
        if lines.is_empty() {
            debug!(publisher = %self.kind(), "Nothing to write for configured scope");
            return Ok(());
        }

        let mut query = vec![
            ("db", self.config.db_name.as_str()),
            ("precision", "ms"),
        ];
        if let Some(rp) = &self.config.retention_policy {
            query.push(("rp", rp.as_str()));
        }
        let request = self
            .client
            .post(join_url(&self.config.url, &["write"]))
            .query(&query)
            .body(lines.join("\n"));
        send_checked(self.kind(), request).await?;
        debug!(publisher = %self.kind(), points = lines.len(), "Points written");
        Ok(())
    }
}

fn float(value: u64) -> String {
    format!("{:?}", value as f64)
}

fn tag_set(tags: &[(&str, &str)]) -> String {
    tags.iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!(",{}={}", escape_tag(k), escape_tag(v)))
        .collect()
}

// Line protocol separates points with newlines.
fn strip_line_breaks(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

fn escape_measurement(value: &str) -> String {
    strip_line_breaks(value).replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_tag(value: &str) -> String {
    strip_line_breaks(value)
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

fn string_field(value: &str) -> String {
    format!("\"{}\"", strip_line_breaks(value).replace('\\', "\\\\").replace('"', "\\\""))
}
