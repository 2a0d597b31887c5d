//! Report data model: per-task records, custom properties and the assembled execution report.

pub mod execution;
pub mod properties;
pub mod task;

pub use execution::ExecutionReport;
pub use properties::CustomProperties;
pub use task::{derive_module, task_record, task_record_at, TaskRecord, TaskState, NO_MODULE};
