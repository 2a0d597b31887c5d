//! Document-store sink: build and task documents posted as JSON to collection endpoints.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::PublishError;
use crate::publisher::configuration::{
    DocumentStorePublisherConfiguration, PublishScope, PublisherKind,
};
use crate::publisher::sink::Sink;
use crate::publisher::sinks::http::{build_sink_http_client, join_url, send_checked};
use crate::report::{ExecutionReport, TaskRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<&'a str>,
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration: u64,
    pub configuration: u64,
    pub success: bool,
    pub configuration_cache_hit: bool,
    pub requested_tasks: &'a [String],
    #[serde(flatten)]
    pub properties: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<&'a str>,
    pub task: &'a str,
    pub name: &'a str,
    pub module: &'a str,
    pub state: &'a str,
    pub root_node: bool,
    pub value: u64,
    pub start_ms: u64,
    pub stop_ms: u64,
    #[serde(flatten)]
    pub properties: &'a BTreeMap<String, String>,
}

impl<'a> BuildDocument<'a> {
    pub fn from_report(report: &'a ExecutionReport) -> Self {
        Self {
            build_id: report.build_id.as_deref(),
            start_ms: report.start_ms,
            end_ms: report.end_ms,
            duration: report.duration_ms,
            configuration: report.configuration_duration_ms,
            success: report.success,
            configuration_cache_hit: report.configuration_cache_hit,
            requested_tasks: &report.requested_tasks,
            properties: &report.custom_properties.build_properties,
        }
    }
}

impl<'a> TaskDocument<'a> {
    pub fn from_task(task: &'a TaskRecord, report: &'a ExecutionReport) -> Self {
        Self {
            build_id: report.build_id.as_deref(),
            task: &task.path,
            name: &task.name,
            module: &task.module,
            state: task.state.as_str(),
            root_node: task.is_requested,
            value: task.duration_ms,
            start_ms: task.start_ms,
            stop_ms: task.stop_ms,
            properties: &report.custom_properties.task_properties,
        }
    }
}

pub struct DocumentStoreSink {
    config: DocumentStorePublisherConfiguration,
    scope: PublishScope,
    client: Client,
}

impl DocumentStoreSink {
    pub fn new(
        config: DocumentStorePublisherConfiguration,
        scope: PublishScope,
    ) -> Result<Self, PublishError> {
        let scope = scope.restrict(config.publish_build_metrics, config.publish_task_metrics);
        Ok(Self {
            client: build_sink_http_client(PublisherKind::DocumentStore)?,
            config,
            scope,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        join_url(&self.config.url, &[&self.config.db_name, collection])
    }
}

#[async_trait]
impl Sink for DocumentStoreSink {
    fn kind(&self) -> PublisherKind {
        PublisherKind::DocumentStore
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        if self.scope.tasks && !report.tasks.is_empty() {
            let documents: Vec<TaskDocument<'_>> = report
                .tasks
                .iter()
                .map(|task| TaskDocument::from_task(task, report))
                .collect();
            let body = serde_json::to_vec(&documents)?;
            let request = self
                .client
                .post(self.collection_url(&self.config.task_collection_name))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
            send_checked(self.kind(), request).await?;
            debug!(publisher = %self.kind(), documents = documents.len(), "Task documents inserted");
        }

        if self.scope.build {
            let body = serde_json::to_vec(&BuildDocument::from_report(report))?;
            let request = self
                .client
                .post(self.collection_url(&self.config.build_collection_name))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
            send_checked(self.kind(), request).await?;
            debug!(publisher = %self.kind(), "Build document inserted");
        }
        Ok(())
    }
}
