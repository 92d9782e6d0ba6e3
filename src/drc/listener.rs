//! Receivers of the run event stream

use super::types::DrcEvent;
use std::sync::mpsc::Sender;

/// Gets every event of a run, in order, on the thread running the check
pub trait DrcListener {
    fn on_event(&mut self, event: DrcEvent);
}

impl<F: FnMut(DrcEvent)> DrcListener for F {
    fn on_event(&mut self, event: DrcEvent) {
        self(event)
    }
}

impl DrcListener for Vec<DrcEvent> {
    fn on_event(&mut self, event: DrcEvent) {
        self.push(event);
    }
}

impl DrcListener for Sender<DrcEvent> {
    fn on_event(&mut self, event: DrcEvent) {
        // Receiver may have hung up; the run still completes
        let _ = self.send(event);
    }
}

/// Discards all events
#[derive(Clone, Copy, Debug, Default)]
pub struct NullListener;

impl DrcListener for NullListener {
    fn on_event(&mut self, _event: DrcEvent) {}
}
