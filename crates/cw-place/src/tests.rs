//! Unit tests for cw-place.

use cw_actor::{
    Actor, ActorStore, Commodity, Component, EventAction, PlannedEvent, Segment, SegmentKind,
};
use cw_core::{ActorId, Coord, PlaceId, PlaceKind, Rng, Terrain, TimeDuration, TimePoint};

use crate::catchup::{admit_arrival, fabricate_window};
use crate::error::PlaceError;
use crate::params::EncounterParams;
use crate::place::Place;
use crate::tick::{DriftSpawner, EncounterGate, NoGate, TickCtx};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Params with fabrication turned off, so rosters stay exactly as built.
fn quiet_params() -> EncounterParams {
    EncounterParams {
        arrivals_per_hour: 0.0,
        ..EncounterParams::default()
    }
}

/// A place whose local clock is pinned to `encounter` exactly.
fn pinned_place(encounter: i64) -> Place {
    let params = quiet_params();
    let mut place = Place::new(
        PlaceId(0),
        "junction",
        Coord::new(0.0, 0.0),
        Terrain::Flats,
        PlaceKind::Settlement,
        1.0,
        100,
        TimePoint(encounter),
        Rng::new(7),
        &params,
    );
    place.encounter_time = TimePoint(encounter);
    place.fabricated_to = TimePoint(encounter);
    place
}

fn idler_actor(store: &mut ActorStore, name: &str, at: i64) -> ActorId {
    let id = store.alloc_id();
    let mut actor = Actor::new(id, name, "wanderer", Rng::new(100 + id.0 as u64), TimePoint(at));
    actor.attach(Component::idler(TimeDuration::hours(1)));
    store.insert(actor);
    id
}

fn idle_event(start: i64, end: i64) -> PlannedEvent {
    PlannedEvent::new(0, TimePoint(start), TimePoint(end), EventAction::Idle)
}

macro_rules! tick_ctx {
    ($ctx:ident, $actors:expr, $params:expr) => {
        let mut gate = NoGate;
        let mut spawner = DriftSpawner::default();
        let mut $ctx = TickCtx {
            actors: $actors,
            exits: &[],
            params: $params,
            player: None,
            gate: &mut gate,
            spawner: &mut spawner,
        };
    };
}

// ── Catch-up ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod catchup {
    use super::*;

    #[test]
    fn dual_admission_filter() {
        let now = TimePoint(1_000);
        let encounter = TimePoint(500);
        let life = TimeDuration::secs(200);

        // Behind the local clock: never admitted, however alive.
        assert!(!admit_arrival(TimePoint(450), life, now, encounter));
        // Already gone again by `now`.
        assert!(!admit_arrival(TimePoint(600), life, now, encounter));
        assert!(!admit_arrival(TimePoint(750), life, now, encounter));
        // Departure exactly at `now` does not count as present.
        assert!(!admit_arrival(TimePoint(800), life, now, encounter));
        // Still present and not in the past: admitted.
        assert!(admit_arrival(TimePoint(900), life, now, encounter));
        assert!(admit_arrival(TimePoint(990), life, now, encounter));
    }

    #[test]
    fn fabrication_is_pure_in_stream_and_window() {
        let params = EncounterParams {
            arrivals_per_hour: 20.0,
            ..EncounterParams::default()
        };
        let mut rng_a = Rng::new(42);
        let mut rng_b = Rng::new(42);
        let a = fabricate_window(&mut rng_a, TimePoint(0), TimePoint(3_600), TimePoint(0), &params);
        let b = fabricate_window(&mut rng_b, TimePoint(0), TimePoint(3_600), TimePoint(0), &params);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn fabricated_arrivals_sorted_and_filtered() {
        let params = EncounterParams {
            arrivals_per_hour: 50.0,
            ..EncounterParams::default()
        };
        let mut rng = Rng::new(9);
        let encounter = TimePoint(1_800);
        let arrivals =
            fabricate_window(&mut rng, TimePoint(0), TimePoint(3_600), encounter, &params);
        assert!(!arrivals.is_empty());
        for pair in arrivals.windows(2) {
            assert!(pair[0].at <= pair[1].at, "not sorted");
        }
        for a in &arrivals {
            assert!(a.at >= encounter, "arrival behind the local clock");
            assert!(a.at < TimePoint(3_600));
            assert!(a.at + a.lifetime > TimePoint(3_600), "expired arrival admitted");
        }
    }

    #[test]
    fn empty_window_fabricates_nothing() {
        let params = EncounterParams::default();
        let mut rng = Rng::new(1);
        let arrivals =
            fabricate_window(&mut rng, TimePoint(500), TimePoint(500), TimePoint(0), &params);
        assert!(arrivals.is_empty());
    }
}

// ── Construction & admission ──────────────────────────────────────────────────

#[cfg(test)]
mod admission {
    use super::*;

    #[test]
    fn new_place_clock_lags_global_time() {
        let params = EncounterParams::default();
        let mut place = Place::new(
            PlaceId(3),
            "saltflat",
            Coord::new(10.0, -4.0),
            Terrain::Saltpan,
            PlaceKind::Crossroads,
            0.5,
            0,
            TimePoint(100_000),
            Rng::new(11),
            &params,
        );
        assert!(place.encounter_time < TimePoint(100_000));
        assert_eq!(place.fabricated_to, place.encounter_time);
        assert!(place.next_due().is_none());
    }

    #[test]
    fn late_admission_is_contract_violation() {
        let mut place = pinned_place(500);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "late", 400);
        let err = place.admit(id, TimePoint(400), &mut store).unwrap_err();
        assert!(matches!(err, PlaceError::Core(_)));
        assert!(!place.hosts(id));
    }

    #[test]
    fn reschedule_behind_clock_rejected() {
        let mut place = pinned_place(500);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "x", 500);
        place.admit(id, TimePoint(500), &mut store).unwrap();
        assert!(place.reschedule(id, &idle_event(0, 499)).is_err());
        assert!(place.reschedule(id, &idle_event(500, 600)).is_ok());
    }

    #[test]
    fn admit_updates_location_and_knowledge() {
        let mut place = pinned_place(600);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "x", 600);
        place.admit(id, TimePoint(600), &mut store).unwrap();

        let actor = store.get(id).unwrap();
        assert_eq!(actor.location, cw_actor::Location::At(PlaceId(0)));
        let knowledge = actor.knowledge.get(&PlaceId(0)).unwrap();
        assert_eq!(knowledge.last_visit, TimePoint(600));
        assert_eq!(knowledge.visits, 1);
    }
}

// ── Ticking ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ticking {
    use super::*;

    #[test]
    fn three_replans_one_upward_update() {
        let params = quiet_params();
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();

        for (i, end) in [100i64, 200, 300].into_iter().enumerate() {
            let id = idler_actor(&mut store, &format!("a{i}"), 0);
            place.admit(id, TimePoint(0), &mut store).unwrap();
            let ev = idle_event(0, end);
            store.get_mut(id).unwrap().set_next_event(ev).unwrap();
            place.reschedule(id, &ev).unwrap();
        }

        tick_ctx!(ctx, &mut store, &params);
        let report = place.tick(TimePoint(1_000), &mut ctx).unwrap();

        // All three events dispatched, in end order.
        let times: Vec<i64> = report.trace.iter().map(|t| t.time.0).collect();
        assert_eq!(times, vec![100, 200, 300]);
        // Each actor re-planned, yet the world gets exactly one update.
        assert_eq!(place.live_events(), 3);
        let next = report.next_due.unwrap();
        assert!(next > TimePoint(1_000));
        assert_eq!(place.encounter_time, TimePoint(300));
    }

    #[test]
    fn catch_up_bound_holds() {
        let params = quiet_params();
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "a", 0);
        place.admit(id, TimePoint(0), &mut store).unwrap();
        let ev = idle_event(0, 700);
        store.get_mut(id).unwrap().set_next_event(ev).unwrap();
        place.reschedule(id, &ev).unwrap();

        tick_ctx!(ctx, &mut store, &params);
        place.tick(TimePoint(5_000), &mut ctx).unwrap();

        assert!(place.encounter_time <= TimePoint(5_000));
        match place.next_due() {
            Some(due) => assert!(due > TimePoint(5_000)),
            None => {}
        }
    }

    #[test]
    fn encounter_time_monotone_across_ticks() {
        let params = quiet_params();
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "a", 0);
        place.admit(id, TimePoint(0), &mut store).unwrap();
        let ev = idle_event(0, 50);
        store.get_mut(id).unwrap().set_next_event(ev).unwrap();
        place.reschedule(id, &ev).unwrap();

        let mut last = place.encounter_time;
        for horizon in [100i64, 4_000, 8_000, 20_000] {
            tick_ctx!(ctx, &mut store, &params);
            place.tick(TimePoint(horizon), &mut ctx).unwrap();
            assert!(place.encounter_time >= last);
            last = place.encounter_time;
        }
    }

    #[test]
    fn trade_completes_and_advances_both_clocks() {
        let params = quiet_params();
        let mut place = pinned_place(100_000);
        let mut store = ActorStore::new();

        let x = idler_actor(&mut store, "x", 100_000);
        let y = idler_actor(&mut store, "y", 100_000);
        store.get_mut(x).unwrap().supplies.credit(Commodity::Fuel, 100);
        store.get_mut(y).unwrap().supplies.credit(Commodity::Scrap, 500);
        place.admit(x, TimePoint(100_000), &mut store).unwrap();
        place.admit(y, TimePoint(100_000), &mut store).unwrap();

        // X's negotiated deal concludes at 100_060; Y idles far out.
        let deal = PlannedEvent::new(
            5,
            TimePoint(100_000),
            TimePoint(100_060),
            EventAction::Trade {
                with: y,
                give: (Commodity::Fuel, 50),
                take: (Commodity::Scrap, 250),
            },
        );
        store.get_mut(x).unwrap().set_next_event(deal).unwrap();
        place.reschedule(x, &deal).unwrap();
        let lounging = idle_event(100_000, 200_000);
        store.get_mut(y).unwrap().set_next_event(lounging).unwrap();
        place.reschedule(y, &lounging).unwrap();

        tick_ctx!(ctx, &mut store, &params);
        place.tick(TimePoint(100_060), &mut ctx).unwrap();

        // Goods moved both ways.
        let xa = store.get(x).unwrap();
        let ya = store.get(y).unwrap();
        assert_eq!(xa.supplies.qty(Commodity::Fuel), 50);
        assert_eq!(xa.supplies.qty(Commodity::Scrap), 250);
        assert_eq!(ya.supplies.qty(Commodity::Fuel), 50);
        assert_eq!(ya.supplies.qty(Commodity::Scrap), 250);
        // Both sides carry the 300 s hand-over.
        assert_eq!(xa.next_event.unwrap().end, TimePoint(100_360));
        assert_eq!(ya.next_event.unwrap().end, TimePoint(100_360));

        // Run the hand-over out: both clocks advance 300 s past the deal
        // and both actors have a fresh plan.
        tick_ctx!(ctx2, &mut store, &params);
        let report = place.tick(TimePoint(100_360), &mut ctx2).unwrap();
        let xa = store.get(x).unwrap();
        let ya = store.get(y).unwrap();
        assert_eq!(xa.time, TimePoint(100_360));
        assert_eq!(ya.time, TimePoint(100_360));
        assert!(xa.next_event.is_some());
        assert!(ya.next_event.is_some());
        assert!(report.next_due.unwrap() > TimePoint(100_360));
    }

    #[test]
    fn ultimatum_expires_at_deadline_instant() {
        let params = quiet_params();
        let mut place = pinned_place(500);
        let mut store = ActorStore::new();

        // Bandit presses the player-shaped victim at t=1000; nobody reacts.
        let b = store.alloc_id();
        let mut bandit = Actor::new(b, "bandit", "bandit", Rng::new(5), TimePoint(500));
        bandit.segments.push(Segment::new(SegmentKind::Offense, 10, 5));
        store.insert(bandit);
        let p = idler_actor(&mut store, "victim", 500);

        place.admit(b, TimePoint(500), &mut store).unwrap();
        place.admit(p, TimePoint(500), &mut store).unwrap();

        let press = PlannedEvent::new(
            10,
            TimePoint(500),
            TimePoint(1_000),
            EventAction::Press {
                at: p,
                demand: (Commodity::Scrap, 50),
            },
        );
        store.get_mut(b).unwrap().set_next_event(press).unwrap();
        place.reschedule(b, &press).unwrap();
        let wait = idle_event(500, 5_000);
        store.get_mut(p).unwrap().set_next_event(wait).unwrap();
        place.reschedule(p, &wait).unwrap();

        // After the press the place knows to wake at the deadline.
        tick_ctx!(ctx, &mut store, &params);
        place.tick(TimePoint(1_000), &mut ctx).unwrap();
        assert_eq!(
            store.get(b).unwrap().relation(p).unwrap().deadline,
            TimePoint(1_300)
        );
        assert_eq!(place.next_due(), Some(TimePoint(1_300)));

        // The sweep fires exactly at t=1300.
        tick_ctx!(ctx2, &mut store, &params);
        let report = place.tick(TimePoint(1_300), &mut ctx2).unwrap();
        assert!(report.trace.iter().any(|t| t.label == "ultimatum.expired"));
        assert_eq!(place.encounter_time, TimePoint(1_300));

        let bandit = store.get(b).unwrap();
        let victim = store.get(p).unwrap();
        assert!(bandit.relation(p).unwrap().hostile);
        assert!(victim.relation(b).unwrap().hostile);
        assert!(!bandit.relation(p).unwrap().deadline.is_set());
        assert!(bandit.relation(p).unwrap().pending.is_empty());
        // The refusal consequence queued the bandit's strike.
        assert!(matches!(
            bandit.next_event.unwrap().action,
            EventAction::Strike { .. }
        ));
    }

    #[test]
    fn strike_wrecks_and_unhosts_target() {
        let params = quiet_params();
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();

        let a = store.alloc_id();
        let mut attacker = Actor::new(a, "warlord", "bandit", Rng::new(3), TimePoint(0));
        // Overwhelming rating: the damage roll cannot plausibly go to zero.
        attacker.segments.push(Segment::new(SegmentKind::Offense, 10, 1_000));
        store.insert(attacker);
        let v = store.alloc_id();
        let mut victim = Actor::new(v, "prey", "wanderer", Rng::new(4), TimePoint(0));
        victim.segments.push(Segment::new(SegmentKind::Habitat, 1, 1));
        store.insert(victim);

        place.admit(a, TimePoint(0), &mut store).unwrap();
        place.admit(v, TimePoint(0), &mut store).unwrap();

        let strike = PlannedEvent::new(20, TimePoint(0), TimePoint(60), EventAction::Strike { at: v });
        store.get_mut(a).unwrap().set_next_event(strike).unwrap();
        place.reschedule(a, &strike).unwrap();

        tick_ctx!(ctx, &mut store, &params);
        let report = place.tick(TimePoint(60), &mut ctx).unwrap();

        assert_eq!(report.ended, vec![v]);
        assert!(!place.hosts(v));
        let attacker = store.get(a).unwrap();
        let victim = store.get(v).unwrap();
        assert_eq!(victim.end_state, Some(cw_actor::EndState::Destroyed));
        // Counters moved on both sides of the relation pair.
        assert_eq!(attacker.relation(v).unwrap().potential_sent(), 1_000);
        assert!(attacker.relation(v).unwrap().inflicted() > 0);
        assert!(victim.relation(a).unwrap().taken() > 0);
    }

    #[test]
    fn fabrication_populates_quiet_roster() {
        let params = EncounterParams {
            arrivals_per_hour: 50.0,
            ..EncounterParams::default()
        };
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "anchor", 0);
        place.admit(id, TimePoint(0), &mut store).unwrap();
        let ev = idle_event(0, 3_600);
        store.get_mut(id).unwrap().set_next_event(ev).unwrap();
        place.reschedule(id, &ev).unwrap();

        tick_ctx!(ctx, &mut store, &params);
        let report = place.tick(TimePoint(3_600), &mut ctx).unwrap();

        assert!(!report.spawned.is_empty());
        for &spawned in &report.spawned {
            assert!(place.hosts(spawned));
            assert!(store.get(spawned).is_some());
        }
        // Dispatch order stayed chronological despite mid-loop insertion.
        for pair in report.trace.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }

    #[test]
    fn player_wake_notifies_gate() {
        struct Recorder {
            woken: bool,
        }
        impl EncounterGate for Recorder {
            fn player_wake(&mut self, _: &mut Place, _: &mut ActorStore, _: ActorId) {
                self.woken = true;
            }
        }

        let params = quiet_params();
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();
        let hero = idler_actor(&mut store, "hero", 0);
        place.admit(hero, TimePoint(0), &mut store).unwrap();
        let ev = idle_event(0, 100);
        store.get_mut(hero).unwrap().set_next_event(ev).unwrap();
        place.reschedule(hero, &ev).unwrap();

        let mut gate = Recorder { woken: false };
        let mut spawner = DriftSpawner::default();
        let mut ctx = TickCtx {
            actors: &mut store,
            exits: &[],
            params: &params,
            player: Some(hero),
            gate: &mut gate,
            spawner: &mut spawner,
        };
        place.tick(TimePoint(1_000), &mut ctx).unwrap();
        assert!(gate.woken);
    }

    #[test]
    fn departure_reported_and_unhosted() {
        let params = quiet_params();
        let mut place = pinned_place(0);
        let mut store = ActorStore::new();
        let id = idler_actor(&mut store, "rover", 0);
        place.admit(id, TimePoint(0), &mut store).unwrap();

        let depart = PlannedEvent::new(
            1,
            TimePoint(0),
            TimePoint(600),
            EventAction::Depart {
                road: cw_core::RoadId(4),
                to: PlaceId(9),
            },
        );
        store.get_mut(id).unwrap().set_next_event(depart).unwrap();
        place.reschedule(id, &depart).unwrap();

        tick_ctx!(ctx, &mut store, &params);
        let report = place.tick(TimePoint(600), &mut ctx).unwrap();

        assert_eq!(report.departures.len(), 1);
        let dep = report.departures[0];
        assert_eq!(dep.actor, id);
        assert_eq!(dep.to, PlaceId(9));
        assert_eq!(dep.at, TimePoint(600));
        assert!(!place.hosts(id));
        assert_eq!(
            store.get(id).unwrap().location,
            cw_actor::Location::OnRoad(cw_core::RoadId(4))
        );
        // Departed actors get no replan here; the world owns them now.
        assert!(store.get(id).unwrap().next_event.is_none());
        assert!(report.next_due.is_none());
    }
}
