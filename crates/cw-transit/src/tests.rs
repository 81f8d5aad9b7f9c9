//! Unit tests for cw-transit.

use cw_core::{ActorId, PlaceId, RoadId, TimePoint};

use crate::contact::detect_crossings;
use crate::convoy::ConvoyRegistry;
use crate::error::TransitError;
use crate::mover::{Mover, TransitRegistry};
use crate::road::RoadGraph;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One 100 km road between places 0 and 1.
fn one_road() -> RoadGraph {
    let mut g = RoadGraph::new();
    g.add_road(PlaceId(0), PlaceId(1), 100.0);
    g
}

// ── Road graph ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod roads {
    use super::*;

    #[test]
    fn between_and_other_end() {
        let mut g = RoadGraph::new();
        let r01 = g.add_road(PlaceId(0), PlaceId(1), 10.0);
        let r12 = g.add_road(PlaceId(1), PlaceId(2), 20.0);

        assert_eq!(g.between(PlaceId(0), PlaceId(1)), Some(r01));
        assert_eq!(g.between(PlaceId(1), PlaceId(0)), Some(r01));
        assert_eq!(g.between(PlaceId(1), PlaceId(2)), Some(r12));
        assert_eq!(g.between(PlaceId(0), PlaceId(2)), None);

        let road = g.get(r01).unwrap();
        assert_eq!(road.other_end(PlaceId(0)), Some(PlaceId(1)));
        assert_eq!(road.other_end(PlaceId(2)), None);
    }

    #[test]
    fn exits_keep_insertion_order() {
        let mut g = RoadGraph::new();
        let r1 = g.add_road(PlaceId(0), PlaceId(1), 10.0);
        let r2 = g.add_road(PlaceId(0), PlaceId(2), 10.0);
        let r3 = g.add_road(PlaceId(0), PlaceId(3), 10.0);
        assert_eq!(g.exits(PlaceId(0)), &[r1, r2, r3]);
        assert_eq!(g.exits(PlaceId(9)), &[] as &[RoadId]);
    }

    #[test]
    fn unknown_road_errors() {
        let g = RoadGraph::new();
        assert!(matches!(
            g.get(RoadId(0)),
            Err(TransitError::RoadNotFound(_))
        ));
    }
}

// ── Movers ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod movers {
    use super::*;

    #[test]
    fn forward_crossing_progress_and_arrival() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        // 50 km/h over 100 km: two hours end to end.
        let m = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 50.0).unwrap();

        assert_eq!(m.direction, 1);
        assert_eq!(m.destination(road), PlaceId(1));
        assert_eq!(m.progress_at(TimePoint(0), road), 0.0);
        assert_eq!(m.progress_at(TimePoint(3_600), road), 0.5);
        assert_eq!(m.progress_at(TimePoint(999_999), road), 1.0);
        assert_eq!(m.arrival_time(road), TimePoint(7_200));
    }

    #[test]
    fn reverse_crossing_mirrors() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let m = Mover::depart(ActorId(0), road, PlaceId(1), TimePoint(100), 50.0).unwrap();

        assert_eq!(m.direction, -1);
        assert_eq!(m.destination(road), PlaceId(0));
        assert_eq!(m.progress_at(TimePoint(100), road), 1.0);
        assert_eq!(m.progress_at(TimePoint(3_700), road), 0.5);
        assert_eq!(m.arrival_time(road), TimePoint(7_300));
    }

    #[test]
    fn registry_tracks_per_road_membership() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let mut reg = TransitRegistry::new();

        let m0 = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 50.0).unwrap();
        let m1 = Mover::depart(ActorId(1), road, PlaceId(1), TimePoint(0), 40.0).unwrap();
        reg.insert(m0).unwrap();
        reg.insert(m1).unwrap();

        assert_eq!(reg.on_road(RoadId(0)), &[ActorId(0), ActorId(1)]);
        assert!(reg.is_in_transit(ActorId(0)));

        let removed = reg.remove(ActorId(0)).unwrap();
        assert_eq!(removed.actor, ActorId(0));
        assert_eq!(reg.on_road(RoadId(0)), &[ActorId(1)]);
    }

    #[test]
    fn double_insert_rejected() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let mut reg = TransitRegistry::new();
        let m = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 50.0).unwrap();
        reg.insert(m).unwrap();
        assert!(matches!(
            reg.insert(m),
            Err(TransitError::AlreadyInTransit(_))
        ));
    }

    #[test]
    fn remove_absent_rejected() {
        let mut reg = TransitRegistry::new();
        assert!(matches!(
            reg.remove(ActorId(5)),
            Err(TransitError::NotInTransit(_))
        ));
    }
}

// ── Contact detection ─────────────────────────────────────────────────────────

#[cfg(test)]
mod contacts {
    use super::*;

    #[test]
    fn opposed_movers_cross_exactly_once() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let a = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 50.0).unwrap();
        let b = Mover::depart(ActorId(1), road, PlaceId(1), TimePoint(0), 50.0).unwrap();

        let contacts = detect_crossings(road, &[&a, &b], TimePoint(0), TimePoint(7_200));
        assert_eq!(contacts.len(), 1);
        let c = contacts[0];
        assert_eq!((c.a, c.b), (ActorId(0), ActorId(1)));
        assert_eq!(c.time, TimePoint(3_600));
        assert!((c.progress - 0.5).abs() < 1e-9);
        assert_eq!(c.progress_key(), 500);
    }

    #[test]
    fn same_direction_no_crossing() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        // The fast one leads from the start; the gap only grows.
        let fast = Mover::resume(ActorId(0), road, 0.1, PlaceId(1), TimePoint(0), 50.0).unwrap();
        let slow = Mover::depart(ActorId(1), road, PlaceId(0), TimePoint(0), 30.0).unwrap();

        let contacts = detect_crossings(road, &[&fast, &slow], TimePoint(0), TimePoint(3_600));
        assert!(contacts.is_empty());
    }

    #[test]
    fn tie_separating_positive_fires() {
        // Both start at the same spot; the first of the pair pulls ahead,
        // so the difference goes 0 → positive.
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let fast = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 80.0).unwrap();
        let slow = Mover::depart(ActorId(1), road, PlaceId(0), TimePoint(0), 20.0).unwrap();

        let contacts = detect_crossings(road, &[&fast, &slow], TimePoint(0), TimePoint(1_800));
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].time, TimePoint(0));
        assert_eq!(contacts[0].progress_key(), 0);
    }

    #[test]
    fn tie_separating_negative_fires() {
        // Same pair, opposite order: the difference goes 0 → negative.
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let fast = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 80.0).unwrap();
        let slow = Mover::depart(ActorId(1), road, PlaceId(0), TimePoint(0), 20.0).unwrap();

        let contacts = detect_crossings(road, &[&slow, &fast], TimePoint(0), TimePoint(1_800));
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].time, TimePoint(0));
        assert_eq!(contacts[0].progress_key(), 0);
    }

    #[test]
    fn overtake_fires_once() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        // Slow one departs first; fast one catches up and passes.
        let slow = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 20.0).unwrap();
        let fast = Mover::depart(ActorId(1), road, PlaceId(0), TimePoint(1_800), 80.0).unwrap();

        // At t=1800: slow at 10 km, fast at 0.  At t=3600: slow 20, fast 40.
        let contacts = detect_crossings(road, &[&slow, &fast], TimePoint(1_800), TimePoint(3_600));
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].time > TimePoint(1_800));
        assert!(contacts[0].time < TimePoint(3_600));
    }

    #[test]
    fn convoy_at_identical_progress_never_self_triggers() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        let a = Mover::depart(ActorId(0), road, PlaceId(0), TimePoint(0), 50.0).unwrap();
        let b = Mover::depart(ActorId(1), road, PlaceId(0), TimePoint(0), 50.0).unwrap();

        let contacts = detect_crossings(road, &[&a, &b], TimePoint(0), TimePoint(7_200));
        assert!(contacts.is_empty());
    }

    #[test]
    fn three_movers_pair_count() {
        let g = one_road();
        let road = g.get(RoadId(0)).unwrap();
        // Two eastbound — the faster one already ahead — and one westbound:
        // the westbound crosses both, the eastbound pair never meet.
        let e1 = Mover::resume(ActorId(0), road, 0.05, PlaceId(1), TimePoint(0), 50.0).unwrap();
        let e2 = Mover::depart(ActorId(1), road, PlaceId(0), TimePoint(0), 30.0).unwrap();
        let w = Mover::depart(ActorId(2), road, PlaceId(1), TimePoint(0), 50.0).unwrap();

        let contacts = detect_crossings(road, &[&e1, &e2, &w], TimePoint(0), TimePoint(7_200));
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|c| c.a == ActorId(2) || c.b == ActorId(2)));
    }
}

// ── Convoys ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod convoys {
    use super::*;

    #[test]
    fn found_join_and_indices() {
        let mut reg = ConvoyRegistry::new();
        let id = reg.found(ActorId(0), PlaceId(5));
        assert!(reg.join(id, ActorId(1)));
        assert!(reg.join(id, ActorId(2)));
        // Already a member of a convoy: refused.
        assert!(!reg.join(id, ActorId(1)));

        let convoy = reg.get(id).unwrap();
        assert_eq!(convoy.leader, ActorId(0));
        assert_eq!(convoy.members, vec![ActorId(0), ActorId(1), ActorId(2)]);
        assert_eq!(reg.at_place(PlaceId(5)), &[id]);
        assert_eq!(reg.of_actor(ActorId(2)).unwrap().id, id);
    }

    #[test]
    fn found_is_idempotent_per_leader() {
        let mut reg = ConvoyRegistry::new();
        let id = reg.found(ActorId(0), PlaceId(5));
        assert_eq!(reg.found(ActorId(0), PlaceId(5)), id);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn leader_leaving_promotes_next() {
        let mut reg = ConvoyRegistry::new();
        let id = reg.found(ActorId(0), PlaceId(5));
        reg.join(id, ActorId(1));
        reg.leave(ActorId(0));
        assert_eq!(reg.get(id).unwrap().leader, ActorId(1));
    }

    #[test]
    fn last_member_leaving_disbands() {
        let mut reg = ConvoyRegistry::new();
        let id = reg.found(ActorId(0), PlaceId(5));
        reg.leave(ActorId(0));
        assert!(reg.get(id).is_none());
        assert!(reg.at_place(PlaceId(5)).is_empty());
        assert!(reg.of_actor(ActorId(0)).is_none());
    }

    #[test]
    fn movement_keeps_indices_consistent() {
        let mut reg = ConvoyRegistry::new();
        let id = reg.found(ActorId(0), PlaceId(5));

        reg.onto_road(id, RoadId(3));
        assert!(reg.at_place(PlaceId(5)).is_empty());
        assert_eq!(reg.on_road(RoadId(3)), &[id]);
        assert_eq!(reg.get(id).unwrap().road, Some(RoadId(3)));
        assert_eq!(reg.get(id).unwrap().place, None);

        reg.into_place(id, PlaceId(6));
        assert!(reg.on_road(RoadId(3)).is_empty());
        assert_eq!(reg.at_place(PlaceId(6)), &[id]);
    }
}
