//! Publisher configuration: a closed set of backend option bags plus the hybrid composite.

use serde::{Deserialize, Serialize};

/// Identity of a publisher kind, used in log lines and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublisherKind {
    InfluxDb,
    DocumentStore,
    PushGateway,
    Output,
    Hybrid,
}

impl PublisherKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PublisherKind::InfluxDb => "InfluxDbPublisher",
            PublisherKind::DocumentStore => "DocumentStorePublisher",
            PublisherKind::PushGateway => "PushGatewayPublisher",
            PublisherKind::Output => "OutputPublisher",
            PublisherKind::Hybrid => "HybridPublisher",
        }
    }
}

impl std::fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backends a hybrid publisher can route a side to.
pub const HYBRID_SUPPORTED_KINDS: [PublisherKind; 3] = [
    PublisherKind::InfluxDb,
    PublisherKind::DocumentStore,
    PublisherKind::PushGateway,
];

/// Which parts of a report a sink persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishScope {
    pub build: bool,
    pub tasks: bool,
}

impl PublishScope {
    pub const ALL: PublishScope = PublishScope {
        build: true,
        tasks: true,
    };
    pub const BUILD_ONLY: PublishScope = PublishScope {
        build: true,
        tasks: false,
    };
    pub const TASKS_ONLY: PublishScope = PublishScope {
        build: false,
        tasks: true,
    };

    /// Narrow this scope by a backend's own publish toggles.
    pub fn restrict(self, build: bool, tasks: bool) -> PublishScope {
        PublishScope {
            build: self.build && build,
            tasks: self.tasks && tasks,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_task_name() -> String {
    "task".to_string()
}

fn default_build_name() -> String {
    "build".to_string()
}

fn default_task_collection() -> String {
    "tasks".to_string()
}

fn default_build_collection() -> String {
    "builds".to_string()
}

/// Time-series backend (InfluxDB 1.x line protocol).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluxDbPublisherConfiguration {
    pub url: String,
    pub db_name: String,
    #[serde(default = "default_task_name")]
    pub task_metric_name: String,
    #[serde(default = "default_build_name")]
    pub build_metric_name: String,
    #[serde(default)]
    pub retention_policy: Option<String>,
    #[serde(default = "default_true")]
    pub publish_build_metrics: bool,
    #[serde(default = "default_true")]
    pub publish_task_metrics: bool,
}

impl InfluxDbPublisherConfiguration {
    pub fn new(url: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            db_name: db_name.into(),
            task_metric_name: default_task_name(),
            build_metric_name: default_build_name(),
            retention_policy: None,
            publish_build_metrics: true,
            publish_task_metrics: true,
        }
    }
}

/// Document-store backend: JSON documents posted per collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStorePublisherConfiguration {
    pub url: String,
    pub db_name: String,
    #[serde(default = "default_task_collection")]
    pub task_collection_name: String,
    #[serde(default = "default_build_collection")]
    pub build_collection_name: String,
    #[serde(default = "default_true")]
    pub publish_build_metrics: bool,
    #[serde(default = "default_true")]
    pub publish_task_metrics: bool,
}

impl DocumentStorePublisherConfiguration {
    pub fn new(url: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            db_name: db_name.into(),
            task_collection_name: default_task_collection(),
            build_collection_name: default_build_collection(),
            publish_build_metrics: true,
            publish_task_metrics: true,
        }
    }
}

/// Prometheus push-gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushGatewayPublisherConfiguration {
    pub url: String,
    #[serde(default = "default_task_name")]
    pub task_job_name: String,
    #[serde(default = "default_build_name")]
    pub build_job_name: String,
    #[serde(default = "default_true")]
    pub publish_build_metrics: bool,
    #[serde(default = "default_true")]
    pub publish_task_metrics: bool,
}

impl PushGatewayPublisherConfiguration {
    pub fn new(url: impl Into<String>, task_job_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            task_job_name: task_job_name.into(),
            build_job_name: default_build_name(),
            publish_build_metrics: true,
            publish_task_metrics: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

/// Plain output sink: a task table and a build summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPublisherConfiguration {
    #[serde(default)]
    pub order: Order,
    /// Limit the table to the first N tasks after ordering.
    #[serde(default)]
    pub number_of_tasks: Option<usize>,
}

/// A single non-composite backend. Hybrid sides are restricted to this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendConfiguration {
    #[serde(rename = "influxdb")]
    InfluxDb(InfluxDbPublisherConfiguration),
    #[serde(rename = "document_store")]
    DocumentStore(DocumentStorePublisherConfiguration),
    #[serde(rename = "pushgateway")]
    PushGateway(PushGatewayPublisherConfiguration),
    #[serde(rename = "output")]
    Output(OutputPublisherConfiguration),
}

impl BackendConfiguration {
    pub fn kind(&self) -> PublisherKind {
        match self {
            BackendConfiguration::InfluxDb(_) => PublisherKind::InfluxDb,
            BackendConfiguration::DocumentStore(_) => PublisherKind::DocumentStore,
            BackendConfiguration::PushGateway(_) => PublisherKind::PushGateway,
            BackendConfiguration::Output(_) => PublisherKind::Output,
        }
    }

    /// Whether a hybrid publisher may route one of its sides here.
    pub fn hybrid_supported(&self) -> bool {
        match self {
            BackendConfiguration::InfluxDb(_)
            | BackendConfiguration::DocumentStore(_)
            | BackendConfiguration::PushGateway(_) => true,
            BackendConfiguration::Output(_) => false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            BackendConfiguration::InfluxDb(c) => {
                validate_url(&c.url)?;
                require("db_name", &c.db_name)?;
                require("task_metric_name", &c.task_metric_name)?;
                require("build_metric_name", &c.build_metric_name)
            }
            BackendConfiguration::DocumentStore(c) => {
                validate_url(&c.url)?;
                require("db_name", &c.db_name)?;
                require("task_collection_name", &c.task_collection_name)?;
                require("build_collection_name", &c.build_collection_name)
            }
            BackendConfiguration::PushGateway(c) => {
                validate_url(&c.url)?;
                require("task_job_name", &c.task_job_name)?;
                require("build_job_name", &c.build_job_name)
            }
            BackendConfiguration::Output(_) => Ok(()),
        }
    }
}

/// Hybrid composite: build-level data to one backend, task-level data to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridPublisherConfiguration {
    #[serde(default)]
    pub build_publisher: Option<BackendConfiguration>,
    #[serde(default)]
    pub task_publisher: Option<BackendConfiguration>,
}

/// Every configurable publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PublisherConfiguration {
    #[serde(rename = "influxdb")]
    InfluxDb(InfluxDbPublisherConfiguration),
    #[serde(rename = "document_store")]
    DocumentStore(DocumentStorePublisherConfiguration),
    #[serde(rename = "pushgateway")]
    PushGateway(PushGatewayPublisherConfiguration),
    #[serde(rename = "output")]
    Output(OutputPublisherConfiguration),
    #[serde(rename = "hybrid")]
    Hybrid(HybridPublisherConfiguration),
}

impl PublisherConfiguration {
    pub fn kind(&self) -> PublisherKind {
        match self {
            PublisherConfiguration::InfluxDb(_) => PublisherKind::InfluxDb,
            PublisherConfiguration::DocumentStore(_) => PublisherKind::DocumentStore,
            PublisherConfiguration::PushGateway(_) => PublisherKind::PushGateway,
            PublisherConfiguration::Output(_) => PublisherKind::Output,
            PublisherConfiguration::Hybrid(_) => PublisherKind::Hybrid,
        }
    }

    /// The single backend this configuration names, or `None` for the hybrid composite.
    pub fn as_backend(&self) -> Option<BackendConfiguration> {
        match self {
            PublisherConfiguration::InfluxDb(c) => Some(BackendConfiguration::InfluxDb(c.clone())),
            PublisherConfiguration::DocumentStore(c) => {
                Some(BackendConfiguration::DocumentStore(c.clone()))
            }
            PublisherConfiguration::PushGateway(c) => {
                Some(BackendConfiguration::PushGateway(c.clone()))
            }
            PublisherConfiguration::Output(c) => Some(BackendConfiguration::Output(c.clone())),
            PublisherConfiguration::Hybrid(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            PublisherConfiguration::Hybrid(hybrid) => {
                if hybrid.build_publisher.is_none() && hybrid.task_publisher.is_none() {
                    return Err("hybrid publisher has neither build_publisher nor task_publisher"
                        .to_string());
                }
                for (side, backend) in [
                    ("build_publisher", &hybrid.build_publisher),
                    ("task_publisher", &hybrid.task_publisher),
                ] {
                    if let Some(backend) = backend {
                        if !backend.hybrid_supported() {
                            return Err(format!(
                                "{side}: {} cannot be used inside a hybrid publisher",
                                backend.kind()
                            ));
                        }
                        backend.validate().map_err(|e| format!("{side}: {e}"))?;
                    }
                }
                Ok(())
            }
            other => match other.as_backend() {
                Some(backend) => backend.validate(),
                None => Ok(()),
            },
        }
    }
}

impl From<BackendConfiguration> for PublisherConfiguration {
    fn from(backend: BackendConfiguration) -> Self {
        match backend {
            BackendConfiguration::InfluxDb(c) => PublisherConfiguration::InfluxDb(c),
            BackendConfiguration::DocumentStore(c) => PublisherConfiguration::DocumentStore(c),
            BackendConfiguration::PushGateway(c) => PublisherConfiguration::PushGateway(c),
            BackendConfiguration::Output(c) => PublisherConfiguration::Output(c),
        }
    }
}

fn validate_url(url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("url cannot be empty".to_string());
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!("url must start with http:// or https://: {url}"));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} cannot be empty"))
    } else {
        Ok(())
    }
}
