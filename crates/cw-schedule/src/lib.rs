//! `cw-schedule` — the generic event queue underneath every scheduler tier.
//!
//! # Why this exists
//!
//! The kernel runs three scheduler tiers (world → place → actor), all with
//! the same contract: at most one live event per tag, priority preemption on
//! admission, and strictly non-decreasing dispatch times.  [`Scheduler`] is
//! that contract once, generic over the event type; the tiers differ only in
//! what a tag is (a place, an actor) and what an event carries.
//!
//! # Lazy deletion
//!
//! Replacing a tag's event does not touch the heap: the old entry stays put
//! and is skipped when it surfaces, by comparing its admission counter
//! against the tag's current pointer.  Admission is O(log n) with no search;
//! the heap grows at most linearly in the number of reschedules and is
//! pruned only on pop.

pub mod queue;


pub use queue::{Admission, QueueEvent, Scheduler};
