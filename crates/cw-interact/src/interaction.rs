//! Interactions — a proposal bound to a mechanic and a subject.

use cw_actor::{Actor, EventAction, PlannedEvent};
use cw_core::{ActorId, TimeDuration, TimePoint};
use tracing::debug;

use crate::error::InteractResult;
use crate::exchange::{ExchangeInteraction, ExchangeOutcome};

/// Priority of the strike scheduled by an attack consequence.
const STRIKE_PRIORITY: i32 = 20;

/// How an interaction may run right now.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Immediacy {
    /// Cannot run; the reason is shown, nothing changes.
    Failed(&'static str),
    /// Runs if the user picks it from a menu.
    Menu,
    /// Runs now without user choice (deadline consequences).
    Immediate,
}

/// What a refusal brings down on the subject.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Consequence {
    /// Mutual hostility latch only.
    Hostility,
    /// Mutual hostility plus an immediate strike wind-up by the mechanic.
    Attack,
}

/// The kinds of interaction a proposal can yield.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum InteractionKind {
    Exchange(ExchangeInteraction),
    Refuse { consequence: Consequence },
}

/// A concrete interaction: mechanic (initiator), subject (receiver), a
/// stable text key for menus and traces, and the action.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Interaction {
    pub mechanic: ActorId,
    pub subject: ActorId,
    pub key: &'static str,
    pub kind: InteractionKind,
}

/// What a performed interaction asks its caller (the place layer) to do.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PerformOutcome {
    /// An exchange ran; both participants carry fresh busy events.
    Exchanged(ExchangeOutcome),
    /// A refusal ran; relations changed and the mechanic may carry a
    /// strike wind-up.
    Refused,
}

impl Interaction {
    /// How this interaction may run for the given participants.
    pub fn immediacy(&self, mechanic: &Actor, subject: &Actor) -> Immediacy {
        if !mechanic.alive() || !subject.alive() {
            return Immediacy::Failed("a participant has ended");
        }
        match &self.kind {
            InteractionKind::Exchange(exchange) => match exchange.disabled(mechanic, subject) {
                Some(reason) => Immediacy::Failed(reason),
                None => Immediacy::Menu,
            },
            InteractionKind::Refuse { .. } => Immediacy::Menu,
        }
    }

    /// Run the interaction.  `now` is the enclosing encounter time, used to
    /// schedule consequence wind-ups.
    ///
    /// Callers drive `Immediate` execution through here as well — the
    /// immediacy override is the caller's decision (deadline sweep), not a
    /// different code path.
    pub fn perform(
        &self,
        mechanic: &mut Actor,
        subject: &mut Actor,
        now: TimePoint,
    ) -> InteractResult<PerformOutcome> {
        match &self.kind {
            InteractionKind::Exchange(exchange) => {
                let outcome = exchange.perform(mechanic, subject)?;
                Ok(PerformOutcome::Exchanged(outcome))
            }
            InteractionKind::Refuse { consequence } => {
                debug!(
                    mechanic = %mechanic.name,
                    subject = %subject.name,
                    ?consequence,
                    "refusal consequence"
                );
                mechanic.relation_mut(subject.id).hostile = true;
                subject.relation_mut(mechanic.id).hostile = true;

                if *consequence == Consequence::Attack {
                    let windup = now + TimeDuration::secs(30);
                    let strike = PlannedEvent::new(
                        STRIKE_PRIORITY,
                        now,
                        windup,
                        EventAction::Strike { at: subject.id },
                    );
                    mechanic.set_next_event(strike)?;
                }
                Ok(PerformOutcome::Refused)
            }
        }
    }
}
