//! Sink contract and resolution of configured backends into sink instances.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{error, info};

use crate::error::PublishError;
use crate::publisher::configuration::{BackendConfiguration, PublishScope, PublisherKind};
use crate::publisher::sinks::{DocumentStoreSink, InfluxDbSink, OutputSink, PushGatewaySink};
use crate::report::ExecutionReport;

/// A backend that persists all or part of an execution report.
///
/// Sinks receive the full report and extract the subset they store.
#[async_trait]
pub trait Sink: Send + Sync {
    fn kind(&self) -> PublisherKind;

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError>;
}

/// Turns a backend configuration into a sink restricted to `scope`.
pub trait SinkFactory: Send + Sync {
    fn resolve(
        &self,
        config: &BackendConfiguration,
        scope: PublishScope,
    ) -> Result<Arc<dyn Sink>, PublishError>;
}

/// Resolves configurations to the built-in backend sinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendSinkFactory;

impl SinkFactory for BackendSinkFactory {
    fn resolve(
        &self,
        config: &BackendConfiguration,
        scope: PublishScope,
    ) -> Result<Arc<dyn Sink>, PublishError> {
        config.validate().map_err(|e| {
            PublishError::Configuration(format!("{}: {}", config.kind(), e))
        })?;
        let sink: Arc<dyn Sink> = match config {
            BackendConfiguration::InfluxDb(c) => Arc::new(InfluxDbSink::new(c.clone(), scope)?),
            BackendConfiguration::DocumentStore(c) => {
                Arc::new(DocumentStoreSink::new(c.clone(), scope)?)
            }
            BackendConfiguration::PushGateway(c) => {
                Arc::new(PushGatewaySink::new(c.clone(), scope)?)
            }
            BackendConfiguration::Output(c) => Arc::new(OutputSink::stdout(c.clone(), scope)),
        };
        Ok(sink)
    }
}

/// Run one sink with error and panic isolation. Every outcome is logged with the sink's identity.
pub(crate) async fn deliver(sink: &dyn Sink, report: &ExecutionReport) -> Result<(), PublishError> {
    let publisher = sink.kind();
    let outcome = match AssertUnwindSafe(sink.publish(report)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(PublishError::Panicked {
            publisher,
            message: panic_message(panic.as_ref()),
        }),
    };
    match &outcome {
        Ok(()) => info!(publisher = %publisher, "Report published"),
        Err(err) => error!(publisher = %publisher, error = %err, "Publisher failed"),
    }
    outcome
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
