//! Place-event vocabulary.
//!
//! Defined here (not in `cw-place`) because both sides of the bus speak it:
//! places publish these events, actor components subscribe to kinds and
//! receive the payloads.

use crate::ids::ActorId;
use crate::time::TimePoint;

/// The kinds of event a place publishes to its roster.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaceEventKind {
    /// An actor has joined the roster.
    Arrived,
    /// An actor is about to leave (still on the roster).
    Leaving,
    /// An actor has left the roster (death included).
    Left,
    /// Periodic housekeeping pulse.
    Tick,
}

/// One published place event.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PlaceEvent {
    pub kind: PlaceEventKind,
    /// The actor the event is about; `None` for [`PlaceEventKind::Tick`].
    pub actor: Option<ActorId>,
    pub time: TimePoint,
}

impl PlaceEvent {
    pub fn arrived(actor: ActorId, time: TimePoint) -> Self {
        PlaceEvent {
            kind: PlaceEventKind::Arrived,
            actor: Some(actor),
            time,
        }
    }

    pub fn leaving(actor: ActorId, time: TimePoint) -> Self {
        PlaceEvent {
            kind: PlaceEventKind::Leaving,
            actor: Some(actor),
            time,
        }
    }

    pub fn left(actor: ActorId, time: TimePoint) -> Self {
        PlaceEvent {
            kind: PlaceEventKind::Left,
            actor: Some(actor),
            time,
        }
    }

    pub fn tick(time: TimePoint) -> Self {
        PlaceEvent {
            kind: PlaceEventKind::Tick,
            actor: None,
            time,
        }
    }
}
