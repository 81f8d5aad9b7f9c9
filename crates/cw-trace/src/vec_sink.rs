//! In-memory trace sink for assertions.

use cw_core::{PlaceId, TimePoint};
use cw_place::TraceEntry;
use cw_world::WorldObserver;

use crate::row::TraceRow;

/// Collects every dispatched event in order.  Two runs from the same seed
/// must yield equal `rows`.
#[derive(Default)]
pub struct VecSink {
    pub rows: Vec<TraceRow>,
    pub ended_at: Option<TimePoint>,
}

impl VecSink {
    pub fn new() -> Self {
        VecSink::default()
    }
}

impl WorldObserver for VecSink {
    fn on_event(&mut self, place: PlaceId, entry: &TraceEntry) {
        self.rows.push(TraceRow::from_entry(place, entry));
    }

    fn on_world_end(&mut self, time: TimePoint) {
        self.ended_at = Some(time);
    }
}
