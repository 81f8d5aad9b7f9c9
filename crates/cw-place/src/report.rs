//! What a tick tells the world.

use cw_core::{ActorId, PlaceId, RoadId, TimePoint};

/// One dispatched actor event, in dispatch order.  The full sequence of
/// these across a run *is* the determinism trace.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TraceEntry {
    pub time: TimePoint,
    pub actor: ActorId,
    pub label: &'static str,
    pub priority: i32,
}

/// An actor that left onto a road during the tick.  The world layer owns
/// transit: it registers the mover and enrolls the arrival.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Departure {
    pub actor: ActorId,
    pub road: RoadId,
    pub to: PlaceId,
    pub at: TimePoint,
}

/// Everything that happened in one [`Place::tick`][crate::Place::tick],
/// batched into a single upward update.
#[derive(Default, Debug)]
pub struct TickReport {
    /// Dispatched events, in order.
    pub trace: Vec<TraceEntry>,
    /// Actors that departed onto roads.
    pub departures: Vec<Departure>,
    /// Actors that reached an end state and were unhosted.
    pub ended: Vec<ActorId>,
    /// Dynamic actors fabricated by catch-up.
    pub spawned: Vec<ActorId>,
    /// The place's next due event after the tick — the one world
    /// re-enrollment this tick produces.  `None` when the place is idle.
    pub next_due: Option<TimePoint>,
    /// `true` if the player's actor ran or re-scheduled this tick.
    pub player_involved: bool,
}
