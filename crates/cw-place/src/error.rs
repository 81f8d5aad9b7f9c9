//! Place-layer error type.

use cw_actor::ActorError;
use cw_core::CoreError;
use cw_interact::InteractError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Actor(#[from] ActorError),

    #[error(transparent)]
    Interact(#[from] InteractError),
}

pub type PlaceResult<T> = Result<T, PlaceError>;
