//! Host-facing telemetry domain: task-completion events, the in-process event bus that
//! carries them to a build service, and shared timestamp/id helpers.

mod types;

pub mod events;
pub mod routing;

pub use events::{BuildTranscript, TaskFinishEvent};
pub use routing::bus::TaskEventBus;
pub use routing::ingestor::EventIngestor;
pub use types::{new_build_id, now_millis};
