//! Kernel-wide error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `CoreError` via `From` impls or wrap it as one variant.  Contract
//! violations are fatal by policy (§ error taxonomy): the main loop
//! propagates them, never swallows them.

use thiserror::Error;

use crate::ids::{ActorId, PlaceId};
use crate::time::TimePoint;

/// The top-level error type for `cw-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Scheduling an event that ends before the clock it must respect.
    #[error("event for {actor} ends at {end}, before {now}")]
    EventInPast {
        actor: ActorId,
        end: TimePoint,
        now: TimePoint,
    },

    /// An actor or place clock asked to move backward.
    #[error("time reversal: {from} -> {to}")]
    TimeReversal { from: TimePoint, to: TimePoint },

    /// Admitting an actor into a place whose local clock is already ahead.
    #[error("admission of {actor} into {place} at {at}, behind encounter time {encounter}")]
    LateAdmission {
        actor: ActorId,
        place: PlaceId,
        at: TimePoint,
        encounter: TimePoint,
    },

    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("place {0} not found")]
    PlaceNotFound(PlaceId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `cw-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
