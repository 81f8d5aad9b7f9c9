//! The trace row format.

use cw_core::{ActorId, PlaceId, TimePoint};
use cw_place::TraceEntry;

/// One dispatched event, flattened for output.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TraceRow {
    pub time: TimePoint,
    pub place: PlaceId,
    pub actor: ActorId,
    pub label: &'static str,
    pub priority: i32,
}

impl TraceRow {
    pub fn from_entry(place: PlaceId, entry: &TraceEntry) -> Self {
        TraceRow {
            time: entry.time,
            place,
            actor: entry.actor,
            label: entry.label,
            priority: entry.priority,
        }
    }

    /// The CSV field tuple, in column order.
    pub fn fields(&self) -> [String; 5] {
        [
            self.time.0.to_string(),
            self.place.0.to_string(),
            self.actor.0.to_string(),
            self.label.to_string(),
            self.priority.to_string(),
        ]
    }
}

/// CSV header, matching [`TraceRow::fields`].
pub const HEADER: [&str; 5] = ["time", "place", "actor", "label", "priority"];
