//! Publish pipeline: filters a closed report, then routes it to the configured publishers.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::PulseConfig;
use crate::filter::{FilterOutcome, FilterPipeline};
use crate::publisher::configuration::PublisherConfiguration;
use crate::publisher::router::{PublishSummary, PublisherRouter};
use crate::report::ExecutionReport;

/// What happened to a report handed to the pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    Published(PublishSummary),
    Suppressed(String),
    NoPublishers,
    /// No async runtime could be built to drive the sinks.
    RuntimeUnavailable(String),
    /// Publishing panicked outside any single sink.
    Aborted(String),
}

impl PipelineOutcome {
    pub fn summary(&self) -> Option<&PublishSummary> {
        match self {
            PipelineOutcome::Published(summary) => Some(summary),
            _ => None,
        }
    }
}

#[derive(Clone, Default)]
pub struct PublishPipeline {
    filters: FilterPipeline,
    router: PublisherRouter,
    publishers: Vec<PublisherConfiguration>,
}

impl PublishPipeline {
    pub fn new(
        filters: FilterPipeline,
        router: PublisherRouter,
        publishers: Vec<PublisherConfiguration>,
    ) -> Self {
        Self {
            filters,
            router,
            publishers,
        }
    }

    /// A pipeline with no filters and no publishers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PulseConfig) -> Self {
        Self::new(
            FilterPipeline::from_config(&config.filter),
            PublisherRouter::default(),
            config.publishers.clone(),
        )
    }

    pub fn publishers(&self) -> &[PublisherConfiguration] {
        &self.publishers
    }

    pub async fn run(&self, report: Arc<ExecutionReport>) -> PipelineOutcome {
        if self.publishers.is_empty() {
            debug!("No publishers configured");
            return PipelineOutcome::NoPublishers;
        }

        let report = match self.filters.run(ExecutionReport::clone(&report)) {
            FilterOutcome::Publish(report) => report,
            FilterOutcome::Suppressed { reason } => return PipelineOutcome::Suppressed(reason),
        };

        let summary = self.router.publish(&report, &self.publishers).await;
        info!(
            delivered = summary.delivered.len(),
            failed = summary.failed.len(),
            "Publishing finished"
        );
        PipelineOutcome::Published(summary)
    }

    /// Drive [`run`](Self::run) to completion from synchronous code.
    ///
    /// Inside an existing runtime, a helper thread builds its own runtime and is joined.
    pub fn run_blocking(&self, report: Arc<ExecutionReport>) -> PipelineOutcome {
        if tokio::runtime::Handle::try_current().is_ok() {
            return std::thread::scope(|scope| {
                let helper = std::thread::Builder::new()
                    .name("buildpulse-publish-sync".to_string())
                    .spawn_scoped(scope, move || self.block_on_fresh_runtime(report));
                match helper {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        error!("Publishing helper thread panicked");
                        PipelineOutcome::Aborted("publishing helper thread panicked".to_string())
                    }),
                    Err(e) => {
                        error!(error = %e, "Failed to spawn publishing helper thread");
                        PipelineOutcome::RuntimeUnavailable(e.to_string())
                    }
                }
            });
        }
        self.block_on_fresh_runtime(report)
    }

    fn block_on_fresh_runtime(&self, report: Arc<ExecutionReport>) -> PipelineOutcome {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt.block_on(self.run(report)),
            Err(e) => {
                error!(error = %e, "Failed to create runtime for publishing");
                PipelineOutcome::RuntimeUnavailable(e.to_string())
            }
        }
    }
}
