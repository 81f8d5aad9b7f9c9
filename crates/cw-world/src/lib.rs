//! `cw-world` — the top scheduler tier and everything that owns the world.
//!
//! # The loop
//!
//! ```text
//! loop:
//!   peek place scheduler and transit scheduler
//!   dispatch the sooner (ties → transit: travel causality first)
//!     place event   → place.tick(global_time); one re-enrollment after
//!     transit event → contact sweep on the road, then arrival fan-out
//!   check end conditions (player ended, UI quit)
//! ```
//!
//! # What lives here
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`world`]    | `World`, scheduler-pair state, construction           |
//! | [`run`]      | `step`/`run`, dispatch, contact promotion             |
//! | [`gate`]     | Tick-time UI bridge (menu build, selection apply)     |
//! | [`ui`]       | `MenuModel`, `UiBridge`, `HeadlessUi`                 |
//! | [`roles`]    | `RoleBook` — role id → component recipe               |
//! | [`observer`] | `WorldObserver`, `NoopObserver`                       |
//! | [`persist`]  | Init/Data save model, two-pass restore                |
//! | [`config`]   | `WorldConfig`                                         |
//! | [`error`]    | `WorldError`, `WorldResult`                           |

pub mod config;
pub mod error;
mod gate;
pub mod observer;
pub mod persist;
pub mod roles;
pub mod run;
pub mod ui;
pub mod world;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{WorldConfig, DEFAULT_SEED};
pub use error::{WorldError, WorldResult};
pub use observer::{NoopObserver, WorldObserver};
pub use persist::{WorldSave, SAVE_VERSION};
pub use roles::RoleBook;
pub use run::{EndReason, RunExit, StepOutcome};
pub use ui::{HeadlessUi, MenuModel, SystemAction, UiBridge, UiSelection};
pub use world::{PlaceDue, TransitDue, World};
