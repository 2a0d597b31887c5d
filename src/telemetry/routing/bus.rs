//! In-process event bus for task-completion events.
//!
//! Host listeners may fire from any thread; the bus serializes them so the build service
//! only ever sees one notification at a time.

use std::sync::mpsc::{channel, Receiver, SendError, Sender};

use crate::telemetry::events::TaskFinishEvent;

#[derive(Clone)]
pub struct TaskEventBus {
    sender: Sender<TaskFinishEvent>,
}

impl TaskEventBus {
    pub fn new_pair() -> (Self, Receiver<TaskFinishEvent>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TaskFinishEvent) -> Result<(), SendError<TaskFinishEvent>> {
        self.sender.send(event)
    }
}
