//! Offers — one side of an exchange.

use cw_actor::{Actor, ActorResult, Commodity};
use cw_core::TimeDuration;

/// One side of an exchange: what the giver puts on the table.
///
/// `disabled_for` is the **sole** gate before `perform_on`; it must be
/// conservative, because by contract a perform may not fail after the other
/// side has already mutated.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Offer {
    /// Hand over a quantity of a commodity.
    Goods { commodity: Commodity, qty: i64 },
    /// Spare the receiver: latch spared, drop hostility.
    Spare,
    /// Put nothing on the table (the empty side of a one-way concession).
    Stand,
}

impl Offer {
    /// Why `giver` cannot perform this offer toward `receiver` right now,
    /// or `None` when enabled.
    pub fn disabled_for(&self, giver: &Actor, _receiver: &Actor) -> Option<&'static str> {
        if !giver.alive() {
            return Some("the giver has ended");
        }
        match *self {
            Offer::Goods { commodity, qty } => {
                if giver.holdings(commodity) < qty {
                    Some("insufficient goods")
                } else {
                    None
                }
            }
            Offer::Spare | Offer::Stand => None,
        }
    }

    /// Execute the giver's side.  Callers must have passed
    /// [`disabled_for`][Self::disabled_for] on both sides first.
    pub fn perform_on(&self, giver: &mut Actor, receiver: &mut Actor) -> ActorResult<()> {
        match *self {
            Offer::Goods { commodity, qty } => {
                giver.withdraw(commodity, qty)?;
                receiver.supplies.credit(commodity, qty);
            }
            Offer::Spare => {
                let rel = giver.relation_mut(receiver.id);
                rel.latch_spared();
                rel.hostile = false;
            }
            Offer::Stand => {}
        }
        Ok(())
    }

    /// Appraised value of this offer from `owner`'s side of the table.
    pub fn value_for(&self, _owner: &Actor) -> f64 {
        match *self {
            Offer::Goods { commodity, qty } => qty as f64 * commodity.base_value(),
            // Not being attacked is worth more than any cargo manifest.
            Offer::Spare => 10_000.0,
            Offer::Stand => 0.0,
        }
    }

    /// Nominal time the hand-over consumes.
    pub fn duration(&self) -> TimeDuration {
        match *self {
            Offer::Goods { .. } => TimeDuration::mins(5),
            Offer::Spare | Offer::Stand => TimeDuration::ZERO,
        }
    }
}
