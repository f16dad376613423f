use std::sync::Mutex;

use log::info;

use crate::model::VendorEvent;

/// Destination of the events emitted by committed exchange operations.
pub trait EventSink {
    /// Publish one event.
    fn emit(&self, event: &VendorEvent);
}

/// Sink writing every event to the log.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &VendorEvent) {
        info!("Event: {event}");
    }
}

/// Sink keeping every event in memory, mostly useful in tests.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<VendorEvent>>,
}

impl RecordingEventSink {
    /// The events received so far, oldest first.
    pub fn events(&self) -> Vec<VendorEvent> {
        // A poisoned lock still holds a consistent list of events.
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &VendorEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn emit(&self, event: &VendorEvent) {
        (**self).emit(event)
    }
}
