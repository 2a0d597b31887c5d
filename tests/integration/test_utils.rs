//! Shared test utilities for integration tests
//!
//! Log capture for asserting literal log lines, a recording sink factory, and report
//! fixtures.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use buildpulse::error::PublishError;
use buildpulse::publisher::{
    BackendConfiguration, PublishScope, PublisherKind, Sink, SinkFactory,
};
use buildpulse::report::{ExecutionReport, TaskRecord, TaskState};
use tracing_subscriber::fmt::MakeWriter;

/// Global mutex to serialize environment variable access across tests
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// In-memory log sink for a thread-local subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(|e| e.into_inner())).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture every event emitted on this thread until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

/// One call observed by a [`RecordingFactory`] sink.
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    pub publisher: PublisherKind,
    pub scope: PublishScope,
    pub report: ExecutionReport,
}

/// Resolves every backend to a sink that records what it was asked to publish.
///
/// Kinds listed in `failing` return a transport error instead.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub calls: Arc<Mutex<Vec<RecordedPublish>>>,
    pub failing: Vec<PublisherKind>,
}

impl RecordingFactory {
    pub fn failing(kinds: &[PublisherKind]) -> Self {
        Self {
            failing: kinds.to_vec(),
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<RecordedPublish> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

struct RecordingSink {
    publisher: PublisherKind,
    scope: PublishScope,
    fail: bool,
    calls: Arc<Mutex<Vec<RecordedPublish>>>,
}

#[async_trait]
impl Sink for RecordingSink {
    fn kind(&self) -> PublisherKind {
        self.publisher
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedPublish {
                publisher: self.publisher,
                scope: self.scope,
                report: report.clone(),
            });
        if self.fail {
            return Err(PublishError::Transport {
                publisher: self.publisher,
                message: "backend unreachable".to_string(),
            });
        }
        Ok(())
    }
}

impl SinkFactory for RecordingFactory {
    fn resolve(
        &self,
        config: &BackendConfiguration,
        scope: PublishScope,
    ) -> Result<Arc<dyn Sink>, PublishError> {
        Ok(Arc::new(RecordingSink {
            publisher: config.kind(),
            scope,
            fail: self.failing.contains(&config.kind()),
            calls: Arc::clone(&self.calls),
        }))
    }
}

pub fn task(name: &str, path: &str, state: TaskState, duration_ms: u64) -> TaskRecord {
    TaskRecord {
        duration_ms,
        name: name.to_string(),
        path: path.to_string(),
        state,
        is_requested: false,
        module: "app".to_string(),
        start_ms: 0,
        stop_ms: duration_ms,
    }
}

/// The report used by the hybrid end-to-end scenario.
pub fn failed_clean_report() -> ExecutionReport {
    ExecutionReport {
        duration_ms: 10,
        configuration_duration_ms: 1,
        success: false,
        tasks: vec![task("clean", ":clean", TaskState::Executed, 1)],
        ..ExecutionReport::default()
    }
}
