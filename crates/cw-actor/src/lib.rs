//! `cw-actor` — actor state and the component dispatch model.
//!
//! # What lives here
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`actor`]     | `Actor`, `Location`, `EndState`, plan/step loop       |
//! | [`bag`]       | `Commodity`, `Bag`                                    |
//! | [`component`] | `Component` kinds, `PlanCtx`, `Sighting`, `RoadExit`  |
//! | [`event`]     | `PlannedEvent`, `EventAction`                         |
//! | [`relation`]  | `Relation`, `ProposalSpec`, `PendingProposal`         |
//! | [`segment`]   | `Segment`, `SegmentKind`                              |
//! | [`knowledge`] | `PlaceKnowledge`                                      |
//! | [`store`]     | `ActorStore`                                          |
//! | [`error`]     | `ActorError`, `ActorResult`                           |
//!
//! # The dispatch model
//!
//! An actor owns a list of [`Component`]s sorted by descending priority.
//! Planning consults them in order; the first proposal wins and is admitted
//! through [`Actor::set_next_event`]'s preemption discipline.  Place events
//! fan out to subscribed components in registration order, with failing
//! handlers logged and isolated.  Components are runtime-only state,
//! rebuilt from the actor's role on restore.

pub mod actor;
pub mod bag;
pub mod component;
pub mod error;
pub mod event;
pub mod knowledge;
pub mod relation;
pub mod segment;
pub mod store;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use actor::{Actor, EndState, Location};
pub use bag::{Bag, Commodity};
pub use component::{Component, PlanCtx, RoadExit, Sighting};
pub use error::{ActorError, ActorResult};
pub use event::{EventAction, PlannedEvent};
pub use knowledge::PlaceKnowledge;
pub use relation::{PendingProposal, ProposalSpec, Relation};
pub use segment::{Segment, SegmentKind};
pub use store::ActorStore;
