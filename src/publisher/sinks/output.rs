//! Console sink: renders task durations as a table.

use std::io::Write;

use async_trait::async_trait;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use parking_lot::Mutex;

use crate::error::PublishError;
use crate::publisher::configuration::{
    Order, OutputPublisherConfiguration, PublishScope, PublisherKind,
};
use crate::publisher::sink::Sink;
use crate::report::{ExecutionReport, TaskRecord};

pub struct OutputSink {
    config: OutputPublisherConfiguration,
    scope: PublishScope,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl OutputSink {
    pub fn stdout(config: OutputPublisherConfiguration, scope: PublishScope) -> Self {
        Self::with_writer(config, scope, Box::new(std::io::stdout()))
    }

    pub fn with_writer(
        config: OutputPublisherConfiguration,
        scope: PublishScope,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            config,
            scope,
            writer: Mutex::new(writer),
        }
    }

    pub fn render(&self, report: &ExecutionReport) -> String {
        let mut out = String::new();
        if self.scope.tasks && !report.tasks.is_empty() {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Task", "Module", "State", "Duration (ms)"]);
            for task in self.ordered(report) {
                table.add_row(vec![
                    task.path.clone(),
                    task.module.clone(),
                    task.state.to_string(),
                    task.duration_ms.to_string(),
                ]);
            }
            out.push_str(&table.to_string());
            out.push('\n');
        }
        if self.scope.build {
            out.push_str(&format!(
                "Build {} in {} ms (configuration {} ms, {} tasks)\n",
                if report.success { "succeeded" } else { "failed" },
                report.duration_ms,
                report.configuration_duration_ms,
                report.tasks.len()
            ));
        }
        out
    }

    fn ordered<'a>(&self, report: &'a ExecutionReport) -> Vec<&'a TaskRecord> {
        let mut ordered = match self.config.order {
            Order::Desc => report.slowest_tasks(),
            Order::Asc => {
                let mut tasks: Vec<&TaskRecord> = report.tasks.iter().collect();
                tasks.sort_by_key(|t| t.duration_ms);
                tasks
            }
        };
        if let Some(limit) = self.config.number_of_tasks {
            ordered.truncate(limit);
        }
        ordered
    }
}

#[async_trait]
impl Sink for OutputSink {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Output
    }

    async fn publish(&self, report: &ExecutionReport) -> Result<(), PublishError> {
        let rendered = self.render(report);
        if rendered.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock();
        writer.write_all(rendered.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
