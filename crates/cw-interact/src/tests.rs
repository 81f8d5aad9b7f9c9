//! Unit tests for cw-interact.

use cw_actor::{Actor, Commodity, EventAction, PlannedEvent, ProposalSpec, Segment, SegmentKind};
use cw_core::{ActorId, Rng, TimeDuration, TimePoint};

use crate::error::InteractError;
use crate::exchange::ExchangeInteraction;
use crate::interaction::{Immediacy, InteractionKind, PerformOutcome};
use crate::offer::Offer;
use crate::proposal::Proposal;
use crate::ultimatum::{expire_ultimatum, press_ultimatum, DEFAULT_ULTIMATUM_TIMEOUT};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn trader(id: u32, name: &str, fuel: i64, scrap: i64, at: i64) -> Actor {
    let mut a = Actor::new(ActorId(id), name, "wanderer", Rng::new(1), TimePoint(at));
    a.supplies.credit(Commodity::Fuel, fuel);
    a.supplies.credit(Commodity::Scrap, scrap);
    a
}

fn bandit(id: u32, name: &str, at: i64) -> Actor {
    let mut a = Actor::new(ActorId(id), name, "bandit", Rng::new(2), TimePoint(at));
    a.segments.push(Segment::new(SegmentKind::Offense, 10, 5));
    a
}

fn goods(commodity: Commodity, qty: i64) -> Offer {
    Offer::Goods { commodity, qty }
}

// ── Offers ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod offers {
    use super::*;

    #[test]
    fn goods_gate_counts_cargo_overdraw() {
        let mut giver = trader(0, "x", 10, 0, 0);
        giver.cargo.credit(Commodity::Fuel, 40);
        let receiver = trader(1, "y", 0, 0, 0);

        assert!(goods(Commodity::Fuel, 50).disabled_for(&giver, &receiver).is_none());
        assert_eq!(
            goods(Commodity::Fuel, 51).disabled_for(&giver, &receiver),
            Some("insufficient goods")
        );
    }

    #[test]
    fn spare_latches_and_clears_hostility() {
        let mut giver = bandit(0, "b", 0);
        let mut receiver = trader(1, "y", 0, 0, 0);
        giver.relation_mut(receiver.id).hostile = true;

        Offer::Spare.perform_on(&mut giver, &mut receiver).unwrap();
        let rel = giver.relation(receiver.id).unwrap();
        assert!(rel.is_spared());
        assert!(!rel.hostile);
    }

    #[test]
    fn value_follows_base_values() {
        let owner = trader(0, "x", 0, 0, 0);
        assert_eq!(goods(Commodity::Fuel, 10).value_for(&owner), 50.0);
        assert_eq!(goods(Commodity::Scrap, 10).value_for(&owner), 10.0);
        assert_eq!(Offer::Stand.value_for(&owner), 0.0);
        assert!(Offer::Spare.value_for(&owner) > goods(Commodity::Parts, 100).value_for(&owner));
    }
}

// ── Exchange ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod exchange {
    use super::*;

    #[test]
    fn two_actor_trade() {
        // X sells 50 fuel for 250 scrap.
        let mut x = trader(0, "x", 100, 0, 100_000);
        let mut y = trader(1, "y", 0, 500, 100_000);

        let deal = ExchangeInteraction {
            give: goods(Commodity::Fuel, 50),
            take: goods(Commodity::Scrap, 250),
        };
        let outcome = deal.perform(&mut x, &mut y).unwrap();

        assert_eq!(x.supplies.qty(Commodity::Fuel), 50);
        assert_eq!(x.supplies.qty(Commodity::Scrap), 250);
        assert_eq!(y.supplies.qty(Commodity::Fuel), 50);
        assert_eq!(y.supplies.qty(Commodity::Scrap), 250);

        // Both carry a 300 s hand-over event from the synchronized instant.
        assert_eq!(outcome.at, TimePoint(100_000));
        assert_eq!(outcome.duration, TimeDuration::mins(5));
        assert_eq!(x.next_event.unwrap().end, TimePoint(100_300));
        assert_eq!(y.next_event.unwrap().end, TimePoint(100_300));
        assert_eq!(x.next_event.unwrap().action, EventAction::Busy);
    }

    #[test]
    fn perform_synchronizes_to_max_time() {
        let mut x = trader(0, "x", 100, 0, 1_000);
        let mut y = trader(1, "y", 0, 500, 5_000);

        let deal = ExchangeInteraction {
            give: goods(Commodity::Fuel, 1),
            take: goods(Commodity::Scrap, 5),
        };
        let outcome = deal.perform(&mut x, &mut y).unwrap();
        assert_eq!(outcome.at, TimePoint(5_000));
        assert_eq!(x.time, TimePoint(5_000));
        assert_eq!(y.time, TimePoint(5_000));
    }

    #[test]
    fn disabled_side_fails_without_mutation() {
        let mut x = trader(0, "x", 10, 0, 0);
        let mut y = trader(1, "y", 0, 10, 0);

        let deal = ExchangeInteraction {
            give: goods(Commodity::Fuel, 50), // more than x holds
            take: goods(Commodity::Scrap, 5),
        };
        let err = deal.perform(&mut x, &mut y).unwrap_err();
        assert!(matches!(err, InteractError::Disabled("insufficient goods")));
        assert_eq!(x.supplies.qty(Commodity::Fuel), 10);
        assert_eq!(y.supplies.qty(Commodity::Scrap), 10);
        assert!(x.next_event.is_none());
    }

    #[test]
    fn diplomacy_is_instant() {
        let mut b = bandit(0, "b", 700);
        let mut y = trader(1, "y", 0, 500, 700);

        let deal = ExchangeInteraction {
            give: Offer::Spare,
            take: goods(Commodity::Scrap, 100),
        };
        let outcome = deal.perform(&mut b, &mut y).unwrap();
        // Goods side dominates: a hand-over still takes 5 minutes.
        assert_eq!(outcome.duration, TimeDuration::mins(5));

        let parley = ExchangeInteraction {
            give: Offer::Spare,
            take: Offer::Stand,
        };
        let mut b2 = bandit(2, "b2", 700);
        let mut y2 = trader(3, "y2", 0, 0, 700);
        let outcome = parley.perform(&mut b2, &mut y2).unwrap();
        assert_eq!(outcome.duration, TimeDuration::ZERO);
        assert_eq!(b2.next_event.unwrap().end, TimePoint(700));
    }

    #[test]
    fn busy_event_displaces_standing_idle() {
        let mut x = trader(0, "x", 100, 0, 0);
        let mut y = trader(1, "y", 0, 500, 0);
        x.set_next_event(PlannedEvent::idle(TimePoint(0), 10_000)).unwrap();

        let deal = ExchangeInteraction {
            give: goods(Commodity::Fuel, 1),
            take: goods(Commodity::Scrap, 5),
        };
        deal.perform(&mut x, &mut y).unwrap();
        assert_eq!(x.next_event.unwrap().action, EventAction::Busy);
    }
}

// ── Proposal predicates ───────────────────────────────────────────────────────

#[cfg(test)]
mod predicates {
    use super::*;

    fn barter() -> Proposal {
        Proposal::open(ProposalSpec::Barter {
            give: (Commodity::Fuel, 50),
            take: (Commodity::Scrap, 250),
        })
    }

    #[test]
    fn all_three_pass_yields_interaction() {
        let x = trader(0, "x", 100, 0, 0);
        let y = trader(1, "y", 0, 500, 0);
        let p = barter();
        assert!(p.agent_capable(&x));
        assert!(p.subject_capable(&y));
        assert!(p.combination_capable(&x, &y));
        assert_eq!(p.interactions(&x, &y).len(), 1);
    }

    #[test]
    fn any_predicate_false_yields_nothing() {
        let poor = trader(0, "poor", 10, 0, 0);
        let y = trader(1, "y", 0, 500, 0);
        assert!(barter().interactions(&poor, &y).is_empty());

        let x = trader(2, "x", 100, 0, 0);
        let broke = trader(3, "broke", 0, 10, 0);
        assert!(barter().interactions(&x, &broke).is_empty());

        let mut x = trader(4, "x2", 100, 0, 0);
        let y2 = trader(5, "y2", 0, 500, 0);
        x.relation_mut(y2.id).hostile = true;
        assert!(barter().interactions(&x, &y2).is_empty());
    }

    #[test]
    fn ultimatum_refused_for_spared_subject() {
        let mut b = bandit(0, "b", 0);
        let y = trader(1, "y", 0, 500, 0);
        let p = Proposal::open(ProposalSpec::Ultimatum {
            demand: (Commodity::Scrap, 50),
        });
        assert_eq!(p.interactions(&b, &y).len(), 2);
        b.relation_mut(y.id).latch_spared();
        assert!(p.interactions(&b, &y).is_empty());
    }

    #[test]
    fn unarmed_agent_cannot_press() {
        let unarmed = trader(0, "u", 0, 0, 0);
        let p = Proposal::open(ProposalSpec::Ultimatum {
            demand: (Commodity::Scrap, 50),
        });
        assert!(!p.agent_capable(&unarmed));
    }

    #[test]
    fn immediacy_reports_disabled_reason() {
        let x = trader(0, "x", 0, 0, 0);
        let y = trader(1, "y", 0, 500, 0);
        // Build the interaction directly: predicates would filter it out.
        let i = crate::interaction::Interaction {
            mechanic: x.id,
            subject: y.id,
            key: "barter",
            kind: InteractionKind::Exchange(ExchangeInteraction {
                give: goods(Commodity::Fuel, 1),
                take: goods(Commodity::Scrap, 1),
            }),
        };
        assert_eq!(i.immediacy(&x, &y), Immediacy::Failed("insufficient goods"));
    }
}

// ── Ultimatums ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ultimatums {
    use super::*;

    #[test]
    fn press_stamps_relation_deadline() {
        let mut b = bandit(0, "b", 1_000);
        let p = press_ultimatum(
            &mut b,
            ActorId(1),
            (Commodity::Scrap, 50),
            TimePoint(1_000),
            DEFAULT_ULTIMATUM_TIMEOUT,
        );
        assert_eq!(p.expiration, TimePoint(1_300));
        let rel = b.relation(ActorId(1)).unwrap();
        assert_eq!(rel.deadline, TimePoint(1_300));
        assert_eq!(rel.pending.len(), 1);
    }

    #[test]
    fn expiry_fires_attack_consequence() {
        // Bandit presses a demand at t=1000; the player ignores it; at
        // t=1300 the sweep expires it.
        let mut b = bandit(0, "bandit", 1_000);
        let mut p = trader(1, "player", 0, 500, 1_000);
        press_ultimatum(
            &mut b,
            p.id,
            (Commodity::Scrap, 50),
            TimePoint(1_000),
            DEFAULT_ULTIMATUM_TIMEOUT,
        );

        b.advance_to(TimePoint(1_300)).unwrap();
        p.advance_to(TimePoint(1_300)).unwrap();
        let fired = expire_ultimatum(&mut b, &mut p, TimePoint(1_300)).unwrap();
        assert!(fired);

        assert!(b.relation(p.id).unwrap().hostile);
        assert!(p.relation(b.id).unwrap().hostile);
        assert!(!b.relation(p.id).unwrap().deadline.is_set());
        assert!(b.relation(p.id).unwrap().pending.is_empty());
        // The attack consequence scheduled a strike wind-up.
        assert_eq!(
            b.next_event.unwrap().action,
            EventAction::Strike { at: p.id }
        );
    }

    #[test]
    fn expiry_without_pending_clears_deadline_only() {
        let mut b = bandit(0, "b", 0);
        let mut y = trader(1, "y", 0, 0, 0);
        b.relation_mut(y.id).deadline = TimePoint(100);
        let fired = expire_ultimatum(&mut b, &mut y, TimePoint(200)).unwrap();
        assert!(!fired);
        assert!(!b.relation(y.id).unwrap().deadline.is_set());
        assert!(!b.relation(y.id).unwrap().hostile);
    }

    #[test]
    fn accept_interaction_spares_and_pays() {
        let mut b = bandit(0, "b", 2_000);
        let mut y = trader(1, "y", 0, 500, 2_000);
        let p = press_ultimatum(
            &mut b,
            y.id,
            (Commodity::Scrap, 50),
            TimePoint(2_000),
            DEFAULT_ULTIMATUM_TIMEOUT,
        );

        let accept = p
            .interactions(&b, &y)
            .into_iter()
            .find(|i| i.key == "ultimatum.accept")
            .unwrap();
        let outcome = accept.perform(&mut b, &mut y, TimePoint(2_000)).unwrap();
        assert!(matches!(outcome, PerformOutcome::Exchanged(_)));
        assert_eq!(b.supplies.qty(Commodity::Scrap), 50);
        assert_eq!(y.supplies.qty(Commodity::Scrap), 450);
        assert!(b.relation(y.id).unwrap().is_spared());
    }
}
