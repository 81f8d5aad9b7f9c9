//! World-layer error type.

use cw_actor::ActorError;
use cw_core::CoreError;
use cw_interact::InteractError;
use cw_place::PlaceError;
use cw_transit::TransitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Actor(#[from] ActorError),

    #[error(transparent)]
    Interact(#[from] InteractError),

    #[error(transparent)]
    Place(#[from] PlaceError),

    #[error(transparent)]
    Transit(#[from] TransitError),

    /// Corrupt or incompatible save: refuse to load.
    #[error("corrupt save: {0}")]
    CorruptSave(String),

    #[error("save serialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
