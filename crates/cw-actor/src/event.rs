//! Planned events — the single outstanding action of an actor.
//!
//! # Design
//!
//! An actor's intention is data, not a closure: [`EventAction`] is a closed
//! tagged set, and the *kernel* dispatches its begin/complete effects (the
//! `pre`/`post` of the scheduling contract) when the event is simulated
//! through.  Keeping the action serializable is what lets a save file carry
//! `next_event` and a load rebuild every scheduler from actor state alone.

use cw_core::{ActorId, PlaceId, RoadId, TimePoint};

use crate::bag::Commodity;

// ── EventAction ───────────────────────────────────────────────────────────────

/// What a planned event does when simulated through.
///
/// `pre` effects fire once at first simulate-through (e.g. a strike
/// telegraphs potential damage, a departure announces `Leaving`); `post`
/// effects fire at completion.  Both are interpreted by the place/world
/// layer, which has the context the effects mutate.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventAction {
    /// Wait and re-plan at the end.
    Idle,
    /// Time consumed by a completed interaction (trade hand-over, parley).
    Busy,
    /// Pack up and depart onto `road` toward `to`.
    Depart { road: RoadId, to: PlaceId },
    /// Negotiate and execute a barter with a co-located actor.
    Trade {
        with: ActorId,
        give: (Commodity, i64),
        take: (Commodity, i64),
    },
    /// Deliver an ultimatum to a co-located actor.
    Press {
        at: ActorId,
        demand: (Commodity, i64),
    },
    /// Land a blow on a hostile co-located actor.
    Strike { at: ActorId },
}

impl EventAction {
    /// Stable label for traces and diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            EventAction::Idle => "idle",
            EventAction::Busy => "busy",
            EventAction::Depart { .. } => "depart",
            EventAction::Trade { .. } => "trade",
            EventAction::Press { .. } => "press",
            EventAction::Strike { .. } => "strike",
        }
    }
}

// ── PlannedEvent ──────────────────────────────────────────────────────────────

/// An actor's single outstanding planned action.
///
/// Invariants (enforced by [`Actor::set_next_event`][crate::Actor::set_next_event]
/// and the place admission path): `end >= start`, `end >=` the actor's
/// `time`, and — once scheduled — `end >=` the enclosing place's encounter
/// time.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedEvent {
    pub priority: i32,
    pub start: TimePoint,
    pub end: TimePoint,
    pub action: EventAction,
    /// `true` once the begin effect has run; it must never run twice.
    pub pre_done: bool,
}

impl PlannedEvent {
    pub fn new(priority: i32, start: TimePoint, end: TimePoint, action: EventAction) -> Self {
        debug_assert!(end >= start, "event ends before it starts");
        PlannedEvent {
            priority,
            start,
            end,
            action,
            pre_done: false,
        }
    }

    /// An idle event from `now` lasting `secs`.
    pub fn idle(now: TimePoint, secs: i64) -> Self {
        PlannedEvent::new(0, now, TimePoint(now.0 + secs), EventAction::Idle)
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.action.label()
    }
}
