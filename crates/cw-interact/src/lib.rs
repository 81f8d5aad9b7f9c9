//! `cw-interact` — the capability/offer/exchange protocol.
//!
//! # Shape of the protocol
//!
//! ```text
//! Proposal ──(three capability predicates)──▶ Interaction ──▶ perform
//!    │                                            │
//!    │ Barter    ──▶ Exchange(Goods ⇄ Goods)      │ synchronize clocks,
//!    │ Ultimatum ──▶ Accept: Exchange(Spare ⇄ Goods)   gate on disabled_for,
//!    │              Refuse: consequence           │ both sides atomically
//! ```
//!
//! Everything is a closed tagged set: proposals, offers, and interaction
//! kinds are enums with switched dispatch.  The protocol mutates actors
//! only; scheduling follow-ups (busy events) are admitted through the
//! normal actor discipline and propagate through the place like any other
//! plan.

pub mod error;
pub mod exchange;
pub mod interaction;
pub mod offer;
pub mod proposal;
pub mod ultimatum;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{InteractError, InteractResult};
pub use exchange::{ExchangeInteraction, ExchangeOutcome};
pub use interaction::{Consequence, Immediacy, Interaction, InteractionKind, PerformOutcome};
pub use offer::Offer;
pub use proposal::Proposal;
pub use ultimatum::{expire_ultimatum, press_ultimatum, DEFAULT_ULTIMATUM_TIMEOUT};
