//! Interaction-layer error type.

use cw_actor::ActorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InteractError {
    /// An offer's gate refused.  Recoverable: the UI shows the reason and
    /// no state has changed.
    #[error("interaction disabled: {0}")]
    Disabled(&'static str),

    #[error(transparent)]
    Actor(#[from] ActorError),
}

pub type InteractResult<T> = Result<T, InteractError>;
