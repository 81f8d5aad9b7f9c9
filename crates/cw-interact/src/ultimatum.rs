//! Ultimatums: proposals with a deadline and an auto-firing refusal.

use cw_actor::{Actor, Commodity, PendingProposal, ProposalSpec};
use cw_core::{ActorId, TimeDuration, TimePoint};
use tracing::debug;

use crate::error::InteractResult;
use crate::interaction::PerformOutcome;
use crate::proposal::Proposal;

/// Default grace period before a demand auto-refuses.
pub const DEFAULT_ULTIMATUM_TIMEOUT: TimeDuration = TimeDuration::secs(300);

/// Press a demand on `subject`: park the pending proposal on the
/// mechanic's outbound relation, stamp its deadline, and return the live
/// proposal for immediate display.
pub fn press_ultimatum(
    mechanic: &mut Actor,
    subject: ActorId,
    demand: (Commodity, i64),
    now: TimePoint,
    timeout: TimeDuration,
) -> Proposal {
    let expiration = now + timeout;
    let spec = ProposalSpec::Ultimatum { demand };
    let rel = mechanic.relation_mut(subject);
    rel.deadline = expiration;
    rel.push_pending(PendingProposal { spec, expiration });
    debug!(mechanic = %mechanic.name, %subject, %expiration, "ultimatum pressed");
    Proposal::until(spec, expiration)
}

/// Fire the expiry consequence for the mechanic's pending ultimatum
/// against `subject`: the Refuse interaction is performed with immediacy
/// overridden to immediate, and the deadline is cleared.
///
/// Returns `true` if a refusal actually ran (`false` when no pending
/// ultimatum was found — the deadline is still cleared so the sweep never
/// revisits it).
pub fn expire_ultimatum(
    mechanic: &mut Actor,
    subject: &mut Actor,
    now: TimePoint,
) -> InteractResult<bool> {
    let rel = mechanic.relation_mut(subject.id);
    rel.deadline = TimePoint::UNSET;
    let Some(pending) = rel.take_ultimatum() else {
        return Ok(false);
    };

    let proposal = Proposal::until(pending.spec, pending.expiration);
    let refuse = proposal
        .interactions(mechanic, subject)
        .into_iter()
        .find(|i| i.key == "ultimatum.refuse");
    let Some(refuse) = refuse else {
        // Capabilities changed since the demand was pressed (mechanic
        // disarmed, subject ended): nothing to fire.
        return Ok(false);
    };

    let outcome = refuse.perform(mechanic, subject, now)?;
    debug_assert_eq!(outcome, PerformOutcome::Refused);
    Ok(true)
}
