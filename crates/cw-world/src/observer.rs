//! World observer trait for trace collection and progress reporting.

use cw_core::{ActorId, PlaceId, RoadId, TimePoint};
use cw_place::TraceEntry;

/// Callbacks invoked by the world loop at key points.
///
/// All methods have default no-op implementations so implementors only
/// need to override what they care about.  The `on_event` stream, in call
/// order, is the canonical determinism trace.
pub trait WorldObserver {
    /// An actor event was dispatched inside `place`.
    fn on_event(&mut self, _place: PlaceId, _entry: &TraceEntry) {}

    /// An actor finished crossing a road.
    fn on_arrival(&mut self, _actor: ActorId, _road: RoadId, _time: TimePoint) {}

    /// The loop is done (horizon, quiescence, or an end condition).
    fn on_world_end(&mut self, _time: TimePoint) {}
}

/// A [`WorldObserver`] that does nothing.
pub struct NoopObserver;

impl WorldObserver for NoopObserver {}
