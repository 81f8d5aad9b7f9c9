//! Transit-layer error type.

use cw_core::{ActorId, PlaceId, RoadId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitError {
    #[error("actor {0} is already in transit")]
    AlreadyInTransit(ActorId),

    #[error("actor {0} is not in transit")]
    NotInTransit(ActorId),

    /// Missing collaborator, not a contract violation: the planner should
    /// pass and retry later.
    #[error("no road between {a} and {b}")]
    NoRoad { a: PlaceId, b: PlaceId },

    #[error("road {0} not found")]
    RoadNotFound(RoadId),
}

pub type TransitResult<T> = Result<T, TransitError>;
