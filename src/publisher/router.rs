//! Publisher router: fans one report out to every configured publisher with per-publisher
//! failure isolation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error};

use crate::error::PublishError;
use crate::publisher::configuration::{PublishScope, PublisherConfiguration, PublisherKind};
use crate::publisher::hybrid::HybridPublisher;
use crate::publisher::sink::{deliver, panic_message, BackendSinkFactory, Sink, SinkFactory};
use crate::report::ExecutionReport;

/// A publisher that did not deliver, with the reason.
#[derive(Debug)]
pub struct SinkFailure {
    pub publisher: PublisherKind,
    pub error: PublishError,
}

/// Per-publisher results of one routing pass.
#[derive(Debug, Default)]
pub struct PublishSummary {
    pub delivered: Vec<PublisherKind>,
    pub failed: Vec<SinkFailure>,
}

impl PublishSummary {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct PublisherRouter {
    factory: Arc<dyn SinkFactory>,
}

impl Default for PublisherRouter {
    fn default() -> Self {
        Self::new(Arc::new(BackendSinkFactory))
    }
}

impl PublisherRouter {
    pub fn new(factory: Arc<dyn SinkFactory>) -> Self {
        Self { factory }
    }

    /// Resolve a configuration to its sink. Hybrid configurations become a composite that
    /// resolves its own sides through the same factory.
    pub fn resolve(&self, config: &PublisherConfiguration) -> Result<Arc<dyn Sink>, PublishError> {
        match config {
            PublisherConfiguration::Hybrid(hybrid) => Ok(Arc::new(HybridPublisher::new(
                hybrid.clone(),
                Arc::clone(&self.factory),
            ))),
            other => match other.as_backend() {
                Some(backend) => self.factory.resolve(&backend, PublishScope::ALL),
                None => Err(PublishError::Configuration(format!(
                    "{} has no backend",
                    other.kind()
                ))),
            },
        }
    }

    /// Deliver `report` to every publisher. Never fails; the summary records what happened.
    pub async fn publish(
        &self,
        report: &ExecutionReport,
        publishers: &[PublisherConfiguration],
    ) -> PublishSummary {
        debug!(publishers = publishers.len(), "Routing report");
        let deliveries = publishers.iter().map(|config| async move {
            let publisher = config.kind();
            let resolved = catch_unwind(AssertUnwindSafe(|| self.resolve(config)))
                .unwrap_or_else(|panic| {
                    Err(PublishError::Panicked {
                        publisher,
                        message: panic_message(panic.as_ref()),
                    })
                });
            let result = match resolved {
                Ok(sink) => deliver(sink.as_ref(), report).await,
                Err(err) => {
                    error!(publisher = %publisher, error = %err, "Failed to resolve publisher");
                    Err(err)
                }
            };
            (publisher, result)
        });

        let mut summary = PublishSummary::default();
        for (publisher, result) in join_all(deliveries).await {
            match result {
                Ok(()) => summary.delivered.push(publisher),
                Err(error) => summary.failed.push(SinkFailure { publisher, error }),
            }
        }
        summary
    }
}
