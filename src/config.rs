//! Configuration System
//!
//! Layered configuration for publishers, filters, metrics, and logging. Sources are merged
//! with the `config` crate: defaults, the global file, the workspace file, the
//! environment-specific file, then `BUILDPULSE__*` environment variables.

use crate::filter::{BuildFilter, FilterConfiguration, TaskFilter};
use crate::logging::LoggingConfig;
use crate::metrics::MetricsConfiguration;
use crate::publisher::{PublisherConfiguration, PublisherKind};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Publishers every report is routed to
    #[serde(default)]
    pub publishers: Vec<PublisherConfiguration>,

    /// Publish on a dedicated worker instead of blocking close
    #[serde(default)]
    pub publish_on_new_thread: bool,

    #[serde(default)]
    pub filter: FilterConfiguration,

    #[serde(default)]
    pub metrics: MetricsConfiguration,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Publisher {
        index: usize,
        kind: PublisherKind,
        message: String,
    },
    Filter(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Publisher {
                index,
                kind,
                message,
            } => write!(f, "Publisher #{} ({}): {}", index, kind, message),
            ValidationError::Filter(msg) => write!(f, "Filter: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PulseConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (index, publisher) in self.publishers.iter().enumerate() {
            if let Err(message) = publisher.validate() {
                errors.push(ValidationError::Publisher {
                    index,
                    kind: publisher.kind(),
                    message,
                });
            }
        }

        if let Some(task) = &self.filter.task {
            if let Err(e) = TaskFilter::try_new(task) {
                errors.push(ValidationError::Filter(format!("task filter: {}", e)));
            }
        }
        if let Some(build) = &self.filter.build {
            if let Err(e) = BuildFilter::try_new(build) {
                errors.push(ValidationError::Filter(format!("build filter: {}", e)));
            }
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "invalid format '{}'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ValidationError::Logging(format!(
                "invalid output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

}
