//! Drains the event bus into a build service in arrival order.

use std::sync::mpsc::Receiver;

use crate::service::BuildService;
use crate::telemetry::events::TaskFinishEvent;

pub struct EventIngestor {
    receiver: Receiver<TaskFinishEvent>,
}

impl EventIngestor {
    pub fn new(receiver: Receiver<TaskFinishEvent>) -> Self {
        Self { receiver }
    }

    /// Feed every pending event into `service`. Returns how many were delivered.
    pub fn ingest_pending(&mut self, service: &mut BuildService) -> usize {
        let mut count = 0usize;
        while let Ok(event) = self.receiver.try_recv() {
            service.on_task_finish(event);
            count += 1;
        }
        count
    }
}
