//! `cw-core` — foundational types for the `rust_cw` simulation kernel.
//!
//! This crate is a dependency of every other `cw-*` crate.  It intentionally
//! has no `cw-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `ActorId`, `PlaceId`, `RoadId`, `ConvoyId`                |
//! | [`time`]    | `TimePoint`, `TimeDuration`                               |
//! | [`rng`]     | `Rng` (xorshift* stream), path operator, `Gaussian`       |
//! | [`dist`]    | Distribution helpers (choose, Poisson, exponential)       |
//! | [`coord`]   | `Coord`, Euclidean distance                               |
//! | [`terrain`] | `Terrain`, `PlaceKind`                                    |
//! | [`place_event`] | `PlaceEvent`, `PlaceEventKind`                        |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.           |
//!           | Required by `cw-world`.                                       |

pub mod coord;
pub mod dist;
pub mod error;
pub mod ids;
pub mod place_event;
pub mod rng;
pub mod terrain;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use coord::Coord;
pub use error::{CoreError, CoreResult};
pub use ids::{ActorId, ConvoyId, PlaceId, RoadId};
pub use place_event::{PlaceEvent, PlaceEventKind};
pub use rng::{Gaussian, Rng, StreamKey};
pub use terrain::{PlaceKind, Terrain};
pub use time::{TimeDuration, TimePoint};
