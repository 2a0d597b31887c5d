//! Build filter: decides whether an assembled report is published at all.

use tracing::warn;

use crate::error::FilterConfigurationError;
use crate::filter::configuration::BuildFilterConfiguration;
use crate::filter::pattern::IncludeExclude;
use crate::report::ExecutionReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFilterDecision {
    Publish,
    Suppress(String),
}

#[derive(Debug, Clone)]
struct CompiledBuildFilter {
    success: Option<bool>,
    requested_tasks: IncludeExclude,
    min_duration_ms: Option<u64>,
    skip: bool,
}

/// Report-level veto. Without configuration every build is published.
#[derive(Debug, Clone, Default)]
pub struct BuildFilter {
    compiled: Option<CompiledBuildFilter>,
}

impl BuildFilter {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new(config: Option<&BuildFilterConfiguration>) -> Self {
        match config.map(Self::try_new) {
            None => Self::identity(),
            Some(Ok(filter)) => filter,
            Some(Err(err)) => {
                warn!(error = %err, "Invalid build filter configuration; build filtering disabled");
                Self::identity()
            }
        }
    }

    pub fn try_new(config: &BuildFilterConfiguration) -> Result<Self, FilterConfigurationError> {
        Ok(Self {
            compiled: Some(CompiledBuildFilter {
                success: config.success,
                requested_tasks: IncludeExclude::compile(&config.requested_tasks)?,
                min_duration_ms: config.min_duration_ms,
                skip: config.skip,
            }),
        })
    }

    pub fn is_identity(&self) -> bool {
        self.compiled.is_none()
    }

    pub fn evaluate(&self, report: &ExecutionReport) -> BuildFilterDecision {
        let Some(filter) = &self.compiled else {
            return BuildFilterDecision::Publish;
        };

        if filter.skip {
            return BuildFilterDecision::Suppress("publishing explicitly skipped".to_string());
        }
        if let Some(expected) = filter.success {
            if report.success != expected {
                return BuildFilterDecision::Suppress(format!(
                    "build success was {}, filter requires {}",
                    report.success, expected
                ));
            }
        }
        if let Some(min) = filter.min_duration_ms {
            if report.duration_ms < min {
                return BuildFilterDecision::Suppress(format!(
                    "build took {}ms, below minimum of {}ms",
                    report.duration_ms, min
                ));
            }
        }
        if !filter
            .requested_tasks
            .accepts(report.requested_tasks.iter().map(String::as_str))
        {
            return BuildFilterDecision::Suppress(format!(
                "requested tasks [{}] rejected by filter",
                report.requested_tasks.join(", ")
            ));
        }
        BuildFilterDecision::Publish
    }
}
