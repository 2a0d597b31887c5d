//! Built-in metrics, grouped the way they are toggled in configuration.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::metrics::{Metric, MetricTarget, MetricsContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMetric {
    RootProject,
    RequestedTasks,
    ToolVersion,
    Os,
    Arch,
    ProcessorCount,
    User,
    Locale,
    Hostname,
    GitBranch,
    GitUser,
}

pub const DEFAULT_METRICS: [BuiltinMetric; 3] = [
    BuiltinMetric::RootProject,
    BuiltinMetric::RequestedTasks,
    BuiltinMetric::ToolVersion,
];

pub const ENVIRONMENT_METRICS: [BuiltinMetric; 6] = [
    BuiltinMetric::Os,
    BuiltinMetric::Arch,
    BuiltinMetric::ProcessorCount,
    BuiltinMetric::User,
    BuiltinMetric::Locale,
    BuiltinMetric::Hostname,
];

pub const GIT_METRICS: [BuiltinMetric; 2] = [BuiltinMetric::GitBranch, BuiltinMetric::GitUser];

impl Metric for BuiltinMetric {
    fn name(&self) -> &str {
        match self {
            BuiltinMetric::RootProject => "rootProject",
            BuiltinMetric::RequestedTasks => "requestedTasks",
            BuiltinMetric::ToolVersion => "toolVersion",
            BuiltinMetric::Os => "os",
            BuiltinMetric::Arch => "arch",
            BuiltinMetric::ProcessorCount => "processorCount",
            BuiltinMetric::User => "user",
            BuiltinMetric::Locale => "locale",
            BuiltinMetric::Hostname => "hostname",
            BuiltinMetric::GitBranch => "gitBranch",
            BuiltinMetric::GitUser => "gitUser",
        }
    }

    fn collect(&self, ctx: &MetricsContext) -> Option<String> {
        match self {
            BuiltinMetric::RootProject => ctx.root_project_name.clone().or_else(|| {
                ctx.workspace_root
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            }),
            BuiltinMetric::RequestedTasks => Some(ctx.requested_tasks.join(" ")),
            BuiltinMetric::ToolVersion => Some(ctx.tool_version.clone()),
            BuiltinMetric::Os => Some(std::env::consts::OS.to_string()),
            BuiltinMetric::Arch => Some(std::env::consts::ARCH.to_string()),
            BuiltinMetric::ProcessorCount => std::thread::available_parallelism()
                .ok()
                .map(|n| n.get().to_string()),
            BuiltinMetric::User => first_env(&["USER", "USERNAME"]),
            BuiltinMetric::Locale => first_env(&["LC_ALL", "LANG"]),
            BuiltinMetric::Hostname => hostname::get()
                .ok()
                .and_then(|name| name.into_string().ok()),
            BuiltinMetric::GitBranch => {
                git(&ctx.workspace_root, &["rev-parse", "--abbrev-ref", "HEAD"])
            }
            BuiltinMetric::GitUser => git(&ctx.workspace_root, &["config", "user.name"]),
        }
    }
}

/// A fixed name/value pair declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleMetric {
    name: String,
    value: String,
    target: MetricTarget,
}

impl SimpleMetric {
    pub fn new(name: impl Into<String>, value: impl Into<String>, target: MetricTarget) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            target,
        }
    }
}

impl Metric for SimpleMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> MetricTarget {
        self.target
    }

    fn collect(&self, _ctx: &MetricsContext) -> Option<String> {
        Some(self.value.clone())
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
}

fn git(workspace_root: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new("git")
        .args(args)
        .current_dir(workspace_root)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "git unavailable");
            return None;
        }
    };
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
