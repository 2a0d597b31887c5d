//! Build service: collects task-finish notifications for one build and, on close, assembles
//! the execution report and hands it to the publish pipeline.
//!
//! One service per build. Notifications arrive sequentially (`&mut self`), and `close` is the
//! only place a second thread may be introduced.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};

use crate::publisher::sink::panic_message;
use crate::publisher::{PipelineOutcome, PublishPipeline};
use crate::report::{task_record_at, CustomProperties, ExecutionReport, TaskRecord};
use crate::telemetry::{now_millis, TaskFinishEvent};

/// Lifecycle of a [`BuildService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Init,
    Collecting,
    Closing,
    Published,
}

/// Host-supplied inputs for one build.
#[derive(Clone)]
pub struct BuildServiceParams {
    pub build_start_ms: u64,
    pub requested_tasks: Vec<String>,
    /// Returns false when the host reused a cached configuration.
    pub configuration_phase_executed: Arc<dyn Fn() -> bool + Send + Sync>,
    pub publish_on_new_thread: bool,
    pub custom_properties: CustomProperties,
    pub build_id: Option<String>,
    /// Millisecond wall clock; replays substitute the recorded timeline.
    pub clock: Arc<dyn Fn() -> u64 + Send + Sync>,
}

impl BuildServiceParams {
    pub fn new(build_start_ms: u64) -> Self {
        Self {
            build_start_ms,
            requested_tasks: Vec::new(),
            configuration_phase_executed: Arc::new(|| true),
            publish_on_new_thread: false,
            custom_properties: CustomProperties::default(),
            build_id: None,
            clock: Arc::new(now_millis),
        }
    }

    pub fn with_requested_tasks(mut self, requested_tasks: Vec<String>) -> Self {
        self.requested_tasks = requested_tasks;
        self
    }

    pub fn with_configuration_phase_executed<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.configuration_phase_executed = Arc::new(predicate);
        self
    }

    pub fn with_publish_on_new_thread(mut self, enabled: bool) -> Self {
        self.publish_on_new_thread = enabled;
        self
    }

    pub fn with_custom_properties(mut self, custom_properties: CustomProperties) -> Self {
        self.custom_properties = custom_properties;
        self
    }

    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }
}

impl fmt::Debug for BuildServiceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildServiceParams")
            .field("build_start_ms", &self.build_start_ms)
            .field("requested_tasks", &self.requested_tasks)
            .field("publish_on_new_thread", &self.publish_on_new_thread)
            .field("custom_properties", &self.custom_properties)
            .field("build_id", &self.build_id)
            .finish_non_exhaustive()
    }
}

/// Handle to the publish started by [`BuildService::close`].
#[derive(Debug)]
pub enum PublishHandle {
    /// Published inline; the outcome is already known.
    Completed(PipelineOutcome),
    /// Publishing on a dedicated worker thread. Dropping the handle detaches it.
    Detached(JoinHandle<PipelineOutcome>),
    /// The service was not collecting, so nothing was dispatched.
    Skipped,
}

impl PublishHandle {
    /// Block until publishing finishes. `None` when skipped or the worker panicked.
    pub fn wait(self) -> Option<PipelineOutcome> {
        match self {
            PublishHandle::Completed(outcome) => Some(outcome),
            PublishHandle::Detached(handle) => match handle.join() {
                Ok(outcome) => Some(outcome),
                Err(_) => {
                    error!("Publisher thread panicked");
                    None
                }
            },
            PublishHandle::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PublishHandle::Skipped)
    }
}

pub struct BuildService {
    params: BuildServiceParams,
    pipeline: Arc<PublishPipeline>,
    state: ServiceState,
    tasks: Vec<TaskRecord>,
    provisional_configuration_ms: Option<u64>,
    report: Option<Arc<ExecutionReport>>,
}

impl BuildService {
    pub fn new(params: BuildServiceParams, pipeline: Arc<PublishPipeline>) -> Self {
        Self {
            params,
            pipeline,
            state: ServiceState::Init,
            tasks: Vec::new(),
            provisional_configuration_ms: None,
            report: None,
        }
    }

    /// Create a service that is already collecting.
    pub fn start(params: BuildServiceParams, pipeline: Arc<PublishPipeline>) -> Self {
        let mut service = Self::new(params, pipeline);
        service.begin();
        service
    }

    pub fn begin(&mut self) {
        if self.state != ServiceState::Init {
            warn!(state = ?self.state, "Build service already started");
            return;
        }
        self.state = ServiceState::Collecting;
        debug!(build_start_ms = self.params.build_start_ms, "Collecting task events");
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// The assembled report, once closed.
    pub fn report(&self) -> Option<&ExecutionReport> {
        self.report.as_deref()
    }

    pub fn on_task_finish(&mut self, event: TaskFinishEvent) {
        if self.state != ServiceState::Collecting {
            warn!(state = ?self.state, task = %event.path, "Task event ignored");
            return;
        }
        let now = (self.params.clock)();
        if self.provisional_configuration_ms.is_none() {
            self.provisional_configuration_ms =
                Some(now.saturating_sub(self.params.build_start_ms));
        }
        self.tasks
            .push(task_record_at(&event, &self.params.requested_tasks, now));
    }

    /// Assemble the report and publish it. Runs once; later calls are skipped.
    ///
    /// Never panics: a panic while assembling ends the build unpublished, and a panic while
    /// publishing inline is reported as [`PipelineOutcome::Aborted`].
    pub fn close(&mut self) -> PublishHandle {
        if self.state != ServiceState::Collecting {
            warn!(state = ?self.state, "Build service not collecting; close skipped");
            return PublishHandle::Skipped;
        }
        self.state = ServiceState::Closing;

        let assembled = catch_unwind(AssertUnwindSafe(|| self.assemble()));
        self.state = ServiceState::Published;
        let report = match assembled {
            Ok(report) => Arc::new(report),
            Err(panic) => {
                error!(
                    error = %panic_message(panic.as_ref()),
                    "Build report assembly panicked; nothing published"
                );
                return PublishHandle::Skipped;
            }
        };
        self.report = Some(Arc::clone(&report));
        info!(
            tasks = report.tasks.len(),
            duration_ms = report.duration_ms,
            success = report.success,
            "Build report assembled"
        );

        if self.params.publish_on_new_thread {
            let pipeline = Arc::clone(&self.pipeline);
            let detached = Arc::clone(&report);
            match std::thread::Builder::new()
                .name("buildpulse-publisher".to_string())
                .spawn(move || pipeline.run_blocking(detached))
            {
                Ok(handle) => return PublishHandle::Detached(handle),
                Err(e) => {
                    error!(error = %e, "Failed to spawn publisher thread; publishing inline");
                }
            }
        }
        let pipeline = &self.pipeline;
        match catch_unwind(AssertUnwindSafe(|| pipeline.run_blocking(report))) {
            Ok(outcome) => PublishHandle::Completed(outcome),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(error = %message, "Publishing panicked");
                PublishHandle::Completed(PipelineOutcome::Aborted(message))
            }
        }
    }

    fn assemble(&mut self) -> ExecutionReport {
        let end_ms = (self.params.clock)();
        let tasks = std::mem::take(&mut self.tasks);
        let configuration_cache_hit = !(self.params.configuration_phase_executed)();
        let configuration_duration_ms = if configuration_cache_hit {
            0
        } else {
            self.provisional_configuration_ms.unwrap_or(0)
        };

        ExecutionReport {
            start_ms: self.params.build_start_ms,
            end_ms,
            duration_ms: end_ms.saturating_sub(self.params.build_start_ms),
            configuration_duration_ms,
            success: ExecutionReport::success_of(&tasks),
            configuration_cache_hit,
            custom_properties: self.params.custom_properties.clone(),
            tasks,
            requested_tasks: self.params.requested_tasks.clone(),
            build_id: self.params.build_id.clone(),
        }
    }
}
