//! Hybrid composite publisher: routes build-level data to one backend and task-level data
//! to another.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::error::PublishError;
use crate::publisher::configuration::{
    BackendConfiguration, HybridPublisherConfiguration, PublishScope, PublisherKind,
    HYBRID_SUPPORTED_KINDS,
};
use crate::publisher::sink::{deliver, Sink, SinkFactory};
use crate::report::ExecutionReport;

pub const BOTH_PUBLISHERS_ABSENT: &str =
    "BuildPublisher and TaskPublisher are null. No publisher will be executed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridSide {
    Build,
    Task,
}

impl HybridSide {
    fn scope(self) -> PublishScope {
        match self {
            HybridSide::Build => PublishScope::BUILD_ONLY,
            HybridSide::Task => PublishScope::TASKS_ONLY,
        }
    }
}

impl std::fmt::Display for HybridSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HybridSide::Build => f.write_str("BuildPublisher"),
            HybridSide::Task => f.write_str("TaskPublisher"),
        }
    }
}

/// A configuration problem found while planning a hybrid dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HybridIssue {
    BothAbsent,
    Unsupported {
        side: HybridSide,
        kind: PublisherKind,
    },
}

impl std::fmt::Display for HybridIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HybridIssue::BothAbsent => f.write_str(BOTH_PUBLISHERS_ABSENT),
            HybridIssue::Unsupported { .. } => {
                let supported: Vec<&str> =
                    HYBRID_SUPPORTED_KINDS.iter().map(|k| k.as_str()).collect();
                write!(
                    f,
                    "Not supported Publisher. Current Publishers supported by HybridPublisher: {}",
                    supported.join(", ")
                )
            }
        }
    }
}

/// Validation result: which sides dispatch, and which problems were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HybridPlan {
    pub dispatches: Vec<(HybridSide, BackendConfiguration)>,
    pub issues: Vec<HybridIssue>,
}

pub struct HybridPublisher {
    config: HybridPublisherConfiguration,
    factory: Arc<dyn SinkFactory>,
}

impl HybridPublisher {
    pub fn new(config: HybridPublisherConfiguration, factory: Arc<dyn SinkFactory>) -> Self {
        Self { config, factory }
    }

    /// Validate both sides in order: both absent, then unsupported kinds per side.
    ///
    /// An unsupported side does not stop a supported sibling from dispatching.
    pub fn plan(config: &HybridPublisherConfiguration) -> HybridPlan {
        let mut plan = HybridPlan::default();
        if config.build_publisher.is_none() && config.task_publisher.is_none() {
            plan.issues.push(HybridIssue::BothAbsent);
            return plan;
        }

        for (side, backend) in [
            (HybridSide::Build, &config.build_publisher),
            (HybridSide::Task, &config.task_publisher),
        ] {
            let Some(backend) = backend else { continue };
            if backend.hybrid_supported() {
                plan.dispatches.push((side, backend.clone()));
            } else {
                plan.issues.push(HybridIssue::Unsupported {
                    side,
                    kind: backend.kind(),
                });
            }
        }
        plan
    }

    async fn dispatch_side(
        &self,
        side: HybridSide,
        backend: &BackendConfiguration,
        report: &ExecutionReport,
    ) -> Result<(), PublishError> {
        let sink = self.factory.resolve(backend, side.scope()).map_err(|err| {
            error!(
                publisher = %backend.kind(),
                side = %side,
                error = %err,
                "Failed to resolve hybrid publisher side"
            );
            err
        })?;
        deliver(sink.as_ref(), report).await
    }
}

#[async_trait]
impl Sink for HybridPublisher {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Hybrid
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        let plan = Self::plan(&self.config);
        for issue in &plan.issues {
            match issue {
                HybridIssue::BothAbsent => error!(publisher = %PublisherKind::Hybrid, "{}", issue),
                HybridIssue::Unsupported { side, kind } => error!(
                    publisher = %PublisherKind::Hybrid,
                    side = %side,
                    kind = %kind,
                    "{}",
                    issue
                ),
            }
        }

        let attempted = plan.dispatches.len();
        let mut failed = 0usize;
        for (side, backend) in &plan.dispatches {
            if self.dispatch_side(*side, backend, report).await.is_err() {
                failed += 1;
            }
        }

        if failed == 0 {
            Ok(())
        } else {
            Err(PublishError::HybridSides { failed, attempted })
        }
    }
}
