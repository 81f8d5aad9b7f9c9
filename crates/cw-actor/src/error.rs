//! Actor-layer error type.

use cw_core::{ActorId, CoreError};
use thiserror::Error;

use crate::bag::Commodity;

#[derive(Debug, Error)]
pub enum ActorError {
    /// A debit asked for more than the bag holds.  Recoverable: the caller
    /// reports a disabled interaction, no state changed.
    #[error("short {need} {commodity} (have {have})")]
    Shortfall {
        commodity: Commodity,
        need: i64,
        have: i64,
    },

    /// An operation targeted an actor already in an end state.
    #[error("actor {0} has ended")]
    Ended(ActorId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ActorResult<T> = Result<T, ActorError>;
