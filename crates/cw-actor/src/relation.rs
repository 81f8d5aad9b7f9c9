//! Directional actor-to-actor relation state.
//!
//! Relations form a directed, potentially cyclic graph.  Each actor stores
//! its *outbound* edges as values keyed by the other actor's id — never as
//! owned back-pointers — so cycles are just data.  When an actor ends, its
//! outbound map is discarded with it; inbound entries held by others remain
//! readable but latch.

use cw_core::TimePoint;

use crate::bag::Commodity;

// ── Pending proposals ─────────────────────────────────────────────────────────

/// The shape of a proposal, as plain data.
///
/// The protocol machinery (capability predicates, interactions, offers)
/// lives in `cw-interact`; relations only need to *store* what has been
/// proposed so deadlines can find it again.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProposalSpec {
    /// Swap `give` (agent side) for `take` (subject side).
    Barter {
        give: (Commodity, i64),
        take: (Commodity, i64),
    },
    /// Hand over `demand` or face the consequence.
    Ultimatum { demand: (Commodity, i64) },
}

impl ProposalSpec {
    /// `true` for proposal kinds whose expiry the deadline sweep enforces.
    pub fn is_ultimatum(self) -> bool {
        matches!(self, ProposalSpec::Ultimatum { .. })
    }
}

/// A proposal parked on a relation, waiting for the subject to respond or
/// the deadline sweep to act.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingProposal {
    pub spec: ProposalSpec,
    /// [`TimePoint::UNSET`] means the proposal never expires.
    pub expiration: TimePoint,
}

// ── Relation ──────────────────────────────────────────────────────────────────

/// Directional relation state A→B.
///
/// Flags split into two regimes: `hostile` and `surrendered` may transition
/// in either direction, while `spared`/`betrayed`/`betrayer` are latching —
/// once set they never clear in the current life.  Damage counters only
/// grow.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    pub hostile: bool,
    pub surrendered: bool,
    spared: bool,
    betrayed: bool,
    betrayer: bool,

    potential_sent: i64,
    inflicted: i64,
    taken: i64,

    /// Ultimatum deadline, or [`TimePoint::UNSET`].
    pub deadline: TimePoint,

    /// Proposals this actor has extended toward the other.
    pub pending: Vec<PendingProposal>,
}

impl Default for Relation {
    fn default() -> Self {
        Relation {
            hostile: false,
            surrendered: false,
            spared: false,
            betrayed: false,
            betrayer: false,
            potential_sent: 0,
            inflicted: 0,
            taken: 0,
            deadline: TimePoint::UNSET,
            pending: Vec::new(),
        }
    }
}

impl Relation {
    pub fn new() -> Self {
        Relation::default()
    }

    // ── Latching flags ────────────────────────────────────────────────────

    #[inline]
    pub fn is_spared(&self) -> bool {
        self.spared
    }

    #[inline]
    pub fn latch_spared(&mut self) {
        self.spared = true;
    }

    #[inline]
    pub fn is_betrayed(&self) -> bool {
        self.betrayed
    }

    #[inline]
    pub fn latch_betrayed(&mut self) {
        self.betrayed = true;
    }

    #[inline]
    pub fn is_betrayer(&self) -> bool {
        self.betrayer
    }

    #[inline]
    pub fn latch_betrayer(&mut self) {
        self.betrayer = true;
    }

    // ── Damage counters (non-decreasing) ──────────────────────────────────

    #[inline]
    pub fn potential_sent(&self) -> i64 {
        self.potential_sent
    }

    #[inline]
    pub fn inflicted(&self) -> i64 {
        self.inflicted
    }

    #[inline]
    pub fn taken(&self) -> i64 {
        self.taken
    }

    pub fn add_potential_sent(&mut self, amount: i64) {
        debug_assert!(amount >= 0);
        self.potential_sent += amount;
    }

    pub fn add_inflicted(&mut self, amount: i64) {
        debug_assert!(amount >= 0);
        self.inflicted += amount;
    }

    pub fn add_taken(&mut self, amount: i64) {
        debug_assert!(amount >= 0);
        self.taken += amount;
    }

    // ── Pending proposals ─────────────────────────────────────────────────

    pub fn push_pending(&mut self, p: PendingProposal) {
        self.pending.push(p);
    }

    /// Remove and return the first pending ultimatum, if any.
    pub fn take_ultimatum(&mut self) -> Option<PendingProposal> {
        let at = self.pending.iter().position(|p| p.spec.is_ultimatum())?;
        Some(self.pending.remove(at))
    }

    /// `true` if an ultimatum deadline is set and has passed `now`.
    pub fn deadline_expired(&self, now: TimePoint) -> bool {
        self.deadline.is_set() && self.deadline <= now
    }
}
