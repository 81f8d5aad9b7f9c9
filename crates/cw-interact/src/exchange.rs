//! Two-sided atomic exchanges.

use cw_actor::{Actor, EventAction, PlannedEvent};
use cw_core::{TimeDuration, TimePoint};

use crate::error::{InteractError, InteractResult};
use crate::offer::Offer;

/// Priority of the time-consumption event admitted after a perform.  Above
/// idle so it always displaces a standing wait; below combat so a pending
/// strike is not forgotten over a hand-over.
const BUSY_PRIORITY: i32 = 5;

/// Result of a performed exchange.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExchangeOutcome {
    /// The common instant both participants were synchronized to.
    pub at: TimePoint,
    /// Nominal duration of the hand-over; both busy events end at
    /// `at + duration`.
    pub duration: TimeDuration,
}

/// A pair of offers performed atomically between two synchronized actors.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExchangeInteraction {
    /// What the mechanic (initiator) gives.
    pub give: Offer,
    /// What the subject gives back.
    pub take: Offer,
}

impl ExchangeInteraction {
    /// The reason this exchange cannot run, or `None` when both gates pass.
    pub fn disabled(&self, mechanic: &Actor, subject: &Actor) -> Option<&'static str> {
        self.give
            .disabled_for(mechanic, subject)
            .or_else(|| self.take.disabled_for(subject, mechanic))
    }

    /// Perform both sides.
    ///
    /// 1. Synchronize both clocks to `t* = max(mechanic.time, subject.time)`.
    /// 2. Re-check both gates — the sole failure point; nothing has mutated.
    /// 3. Agent side first, then subject side.
    /// 4. Admit a busy event on each participant for the nominal duration.
    ///
    /// After return both actors' `time == t*` and their next events (busy or
    /// a surviving higher-priority plan) await re-admission by the place.
    pub fn perform(
        &self,
        mechanic: &mut Actor,
        subject: &mut Actor,
    ) -> InteractResult<ExchangeOutcome> {
        let t = mechanic.time.max(subject.time);
        mechanic.simulate_to(t)?;
        subject.simulate_to(t)?;

        if let Some(reason) = self.disabled(mechanic, subject) {
            return Err(InteractError::Disabled(reason));
        }

        self.give.perform_on(mechanic, subject)?;
        self.take.perform_on(subject, mechanic)?;

        let duration = self.give.duration().max(self.take.duration());
        let busy = PlannedEvent::new(BUSY_PRIORITY, t, t + duration, EventAction::Busy);
        mechanic.set_next_event(busy)?;
        subject.set_next_event(busy)?;

        Ok(ExchangeOutcome { at: t, duration })
    }
}
