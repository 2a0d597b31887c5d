//! CLI presentation: text and json formatters for replay and check results.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

use crate::config::{PulseConfig, ValidationError};
use crate::error::ApiError;
use crate::publisher::{BackendConfiguration, PipelineOutcome, PublisherConfiguration};
use crate::report::ExecutionReport;

use super::parse::CheckFormat;

pub fn format_replay_result(report: &ExecutionReport, outcome: Option<&PipelineOutcome>) -> String {
    let started = chrono::DateTime::from_timestamp_millis(report.start_ms as i64)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| report.start_ms.to_string());
    let mut s = format!(
        "Build replayed:\n  Started: {}\n  Duration: {} ms\n  Configuration: {} ms{}\n  Tasks: {}\n  Success: {}",
        started,
        report.duration_ms,
        report.configuration_duration_ms,
        if report.configuration_cache_hit {
            " (cache hit)"
        } else {
            ""
        },
        report.tasks.len(),
        report.success
    );
    let failed: Vec<&str> = report.failed_tasks().map(|t| t.path.as_str()).collect();
    if !failed.is_empty() {
        s.push_str(&format!("\n  Failed tasks: {}", failed.join(", ")));
    }
    if let Some(build_id) = &report.build_id {
        s.push_str(&format!("\n  Build id: {}", build_id));
    }

    match outcome {
        Some(PipelineOutcome::Published(summary)) => {
            s.push_str(&format!(
                "\n\nPublished to {} of {} publishers",
                summary.delivered.len(),
                summary.attempted()
            ));
            for failure in &summary.failed {
                s.push_str(&format!("\n  - {}: {}", failure.publisher, failure.error));
            }
        }
        Some(PipelineOutcome::Suppressed(reason)) => {
            s.push_str(&format!("\n\nPublishing suppressed: {}", reason));
        }
        Some(PipelineOutcome::NoPublishers) => {
            s.push_str("\n\nNo publishers configured.");
        }
        Some(PipelineOutcome::Aborted(reason)) => {
            s.push_str(&format!("\n\nPublishing aborted: {}", reason));
        }
        Some(PipelineOutcome::RuntimeUnavailable(reason)) => {
            s.push_str(&format!("\n\nPublishing did not run: {}", reason));
        }
        None => s.push_str("\n\nPublishing outcome unavailable."),
    }
    s
}

pub fn format_check_result(
    config: &PulseConfig,
    validation: &Result<(), Vec<ValidationError>>,
    format: CheckFormat,
) -> Result<String, ApiError> {
    let errors: Vec<String> = match validation {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };

    if format == CheckFormat::Json {
        let out = serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "publish_on_new_thread": config.publish_on_new_thread,
            "publishers": config.publishers,
        });
        return serde_json::to_string_pretty(&out)
            .map_err(|e| ApiError::RuntimeError(format!("Failed to render JSON: {}", e)));
    }

    let mut s = if config.publishers.is_empty() {
        "No publishers configured.".to_string()
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["#", "Publisher", "Target"]);
        for (i, publisher) in config.publishers.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                publisher.kind().to_string(),
                describe(publisher),
            ]);
        }
        table.to_string()
    };
    s.push_str(&format!(
        "\nPublish mode: {}",
        if config.publish_on_new_thread {
            "detached"
        } else {
            "inline"
        }
    ));

    if errors.is_empty() {
        s.push_str("\nConfiguration valid");
    } else {
        s.push_str(&format!("\n\nErrors ({}):", errors.len()));
        for e in &errors {
            s.push_str(&format!("\n  - {}", e));
        }
    }
    Ok(s)
}

fn describe(publisher: &PublisherConfiguration) -> String {
    match publisher {
        PublisherConfiguration::Hybrid(hybrid) => {
            let side = |backend: &Option<BackendConfiguration>| match backend {
                Some(backend) => format!("{} {}", backend.kind(), describe_backend(backend)),
                None => "-".to_string(),
            };
            format!(
                "build: {}\ntasks: {}",
                side(&hybrid.build_publisher),
                side(&hybrid.task_publisher)
            )
        }
        other => other
            .as_backend()
            .map(|backend| describe_backend(&backend))
            .unwrap_or_default(),
    }
}

fn describe_backend(backend: &BackendConfiguration) -> String {
    match backend {
        BackendConfiguration::InfluxDb(c) => format!("{} db={}", c.url, c.db_name),
        BackendConfiguration::DocumentStore(c) => format!("{} db={}", c.url, c.db_name),
        BackendConfiguration::PushGateway(c) => format!("{} job={}", c.url, c.task_job_name),
        BackendConfiguration::Output(c) => match c.number_of_tasks {
            Some(n) => format!("stdout, top {}", n),
            None => "stdout".to_string(),
        },
    }
}
