//! CLI route: single dispatch table from parsed commands to domain services.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ConfigLoader, PulseConfig};
use crate::error::ApiError;
use crate::metrics::{MetricsContext, MetricsProvider};
use crate::publisher::PublishPipeline;
use crate::service::{BuildService, BuildServiceParams};
use crate::telemetry::{BuildTranscript, EventIngestor, TaskEventBus};

use super::parse::{CheckFormat, Commands};
use super::presentation::{format_check_result, format_replay_result};

/// Loaded configuration and workspace for one CLI invocation.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PulseConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: PulseConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Replay {
                transcript,
                detached,
            } => self.replay(transcript, *detached),
            Commands::Check { format } => self.check(*format),
        }
    }

    fn check(&self, format: CheckFormat) -> Result<String, ApiError> {
        let validation = self.config.validate();
        let out = format_check_result(&self.config, &validation, format)?;
        match validation {
            Ok(()) => Ok(out),
            Err(_) if format == CheckFormat::Json => Ok(out),
            Err(_) => Err(ApiError::ConfigError(out)),
        }
    }

    fn replay(&self, transcript_path: &Path, detached: bool) -> Result<String, ApiError> {
        // Invalid publishers fail on their own at dispatch; valid siblings still publish.
        if let Err(errors) = self.config.validate() {
            for error in &errors {
                warn!(error = %error, "Publisher configuration invalid");
            }
        }
        let raw = std::fs::read_to_string(transcript_path)?;
        let transcript: BuildTranscript = serde_json::from_str(&raw)?;
        debug!(
            transcript = %transcript_path.display(),
            events = transcript.events.len(),
            "Transcript loaded"
        );

        let ctx = MetricsContext {
            root_project_name: transcript.root_project_name.clone(),
            requested_tasks: transcript.requested_tasks.clone(),
            ..MetricsContext::new(self.workspace_root.clone())
        };
        let properties = MetricsProvider::collect(&self.config.metrics.build(), &ctx);

        let configuration_executed = transcript.configuration_phase_executed;
        let finished_ms = transcript.finished_ms();
        let cursor = Arc::new(AtomicU64::new(transcript.start_ms));
        let clock = Arc::clone(&cursor);
        let mut params = BuildServiceParams::new(transcript.start_ms)
            .with_requested_tasks(transcript.requested_tasks.clone())
            .with_configuration_phase_executed(move || configuration_executed)
            .with_publish_on_new_thread(detached || self.config.publish_on_new_thread)
            .with_custom_properties(properties)
            .with_clock(move || clock.load(Ordering::SeqCst));
        if let Some(build_id) = self.config.metrics.build_id() {
            params = params.with_build_id(build_id);
        }

        let pipeline = Arc::new(PublishPipeline::from_config(&self.config));
        let mut service = BuildService::start(params, pipeline);

        // Each notification is observed when its task started, so the first one marks the end
        // of configuration.
        let (bus, receiver) = TaskEventBus::new_pair();
        let mut ingestor = EventIngestor::new(receiver);
        let mut ingested = 0;
        for event in transcript.events {
            if let Some(observed) = event.start_ms.or(event.end_ms) {
                cursor.fetch_max(observed, Ordering::SeqCst);
            }
            bus.emit(event)
                .map_err(|e| ApiError::RuntimeError(format!("Event bus closed: {}", e)))?;
            ingested += ingestor.ingest_pending(&mut service);
        }
        info!(events = ingested, "Transcript replayed");

        cursor.fetch_max(finished_ms, Ordering::SeqCst);
        let outcome = service.close().wait();
        let report = service
            .report()
            .ok_or_else(|| ApiError::RuntimeError("Build report was not assembled".to_string()))?;
        Ok(format_replay_result(report, outcome.as_ref()))
    }
}
