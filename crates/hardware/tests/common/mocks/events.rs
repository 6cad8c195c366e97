use mockall::mock;
use parking_lot::Mutex;
use tilesim_core::events::{EventSink, SimEvent};

mock! {
    pub Sink {}

    impl EventSink for Sink {
        fn notify(&self, event: &SimEvent);
    }
}

/// Keeps every non-tick event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SimEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &SimEvent) {
        if !matches!(event, SimEvent::TickAdvanced { .. }) {
            self.events.lock().push(*event);
        }
    }
}
