//! `cw-transit` — everything between places.
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`road`]    | `Road`, `RoadGraph` (adjacency, between-lookup)         |
//! | [`mover`]   | `Mover`, `TransitRegistry` (per-actor + per-road index) |
//! | [`contact`] | Sign-crossing contact detection                         |
//! | [`convoy`]  | `Convoy`, `ConvoyRegistry` (actor/place/road indices)   |
//! | [`error`]   | `TransitError`, `TransitResult`                         |
//!
//! The registries are explicitly-owned context objects: the world creates
//! them at construction and passes them into the entry points that need
//! them.  Nothing here is a process-wide singleton.

pub mod contact;
pub mod convoy;
pub mod error;
pub mod mover;
pub mod road;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use contact::{detect_crossings, Contact};
pub use convoy::{Convoy, ConvoyRegistry};
pub use error::{TransitError, TransitResult};
pub use mover::{Mover, TransitRegistry};
pub use road::{Road, RoadGraph};
