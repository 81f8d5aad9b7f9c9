//! The `World`: global state and the scheduler pair.

use cw_actor::{Actor, ActorStore, EventAction, PlannedEvent, RoadExit};
use cw_core::{
    ActorId, Coord, CoreError, PlaceId, PlaceKind, Rng, RoadId, Terrain, TimeDuration, TimePoint,
};
use cw_place::{EncounterParams, Place, PlaceStore};
use cw_schedule::{QueueEvent, Scheduler};
use cw_transit::{ConvoyRegistry, RoadGraph, TransitRegistry};
use rustc_hash::FxHashMap;

use crate::config::WorldConfig;
use crate::error::WorldResult;
use crate::roles::RoleBook;

// ── Scheduler events ──────────────────────────────────────────────────────────

/// World-scheduler entry for a place's next-due wake.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PlaceDue {
    pub place: PlaceId,
    pub due: TimePoint,
}

impl QueueEvent for PlaceDue {
    type Tag = PlaceId;

    fn tag(&self) -> PlaceId {
        self.place
    }
    fn due(&self) -> TimePoint {
        self.due
    }
    fn priority(&self) -> i32 {
        0
    }
}

/// Transit-scheduler entry: an actor's arrival at the far end of a road.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TransitDue {
    pub actor: ActorId,
    pub due: TimePoint,
}

impl QueueEvent for TransitDue {
    type Tag = ActorId;

    fn tag(&self) -> ActorId {
        self.actor
    }
    fn due(&self) -> TimePoint {
        self.due
    }
    fn priority(&self) -> i32 {
        0
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// All simulation state and the two top-level schedulers.
///
/// # Invariant
///
/// Every place in the store has exactly one enrollment in `place_sched`:
/// its soonest live local due, or an idle placeholder `now + max_idle` when
/// it has nothing scheduled.  [`World::enroll_place`] is the only writer.
pub struct World {
    pub config: WorldConfig,
    pub params: EncounterParams,
    pub global_time: TimePoint,
    /// Root stream.  Places and actors branch off it by path, so creation
    /// order never disturbs their streams.
    pub rng: Rng,

    pub actors: ActorStore,
    pub places: PlaceStore,
    pub roads: RoadGraph,
    pub transit: TransitRegistry,
    pub convoys: ConvoyRegistry,
    pub roles: RoleBook,

    pub(crate) place_sched: Scheduler<PlaceDue>,
    pub(crate) transit_sched: Scheduler<TransitDue>,

    /// Last contact-detection instant per road.
    pub(crate) road_watch: FxHashMap<RoadId, TimePoint>,
    /// Ephemeral mid-road places: place → (road, progress along it).
    pub(crate) transit_stops: FxHashMap<PlaceId, (RoadId, f64)>,

    pub player: Option<ActorId>,
    pub(crate) quit: bool,
    pub(crate) save_requested: bool,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let params = config.encounter_params();
        let rng = Rng::new(config.seed);
        World {
            config,
            params,
            global_time: TimePoint::ZERO,
            rng,
            actors: ActorStore::new(),
            places: PlaceStore::new(),
            roads: RoadGraph::new(),
            transit: TransitRegistry::new(),
            convoys: ConvoyRegistry::new(),
            roles: RoleBook::standard(),
            place_sched: Scheduler::new(),
            transit_sched: Scheduler::new(),
            road_watch: FxHashMap::default(),
            transit_stops: FxHashMap::default(),
            player: None,
            quit: false,
            save_requested: false,
        }
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Add a place, its clock lagging `global_time` for catch-up.  The
    /// place's stream is path-derived from the root by name, so worlds
    /// built in any order agree.
    pub fn add_place(
        &mut self,
        name: &str,
        coord: Coord,
        terrain: Terrain,
        kind: PlaceKind,
        wealth: f32,
        population: u32,
    ) -> PlaceId {
        let id = self.places.alloc_id();
        let rng = &self.rng / ("place", name);
        let place = Place::new(
            id,
            name,
            coord,
            terrain,
            kind,
            wealth,
            population,
            self.global_time,
            rng,
            &self.params,
        );
        self.places.insert(place);
        self.enroll_place(id);
        id
    }

    /// Join two places with a road.
    pub fn connect(&mut self, a: PlaceId, b: PlaceId, length_km: f64) -> RoadId {
        self.roads.add_road(a, b, length_km)
    }

    /// Spawn a named actor of `role` into `place`, with its first wake
    /// scheduled immediately.
    pub fn spawn_actor(&mut self, name: &str, role: &str, place_id: PlaceId) -> WorldResult<ActorId> {
        let mut place = self
            .places
            .take(place_id)
            .ok_or(CoreError::PlaceNotFound(place_id))?;
        let at = self.global_time.max(place.encounter_time);

        let id = self.actors.alloc_id();
        let rng = &self.rng / ("actor", name);
        let mut actor = Actor::new(id, name, role, rng, at);
        self.roles.outfit(role, &mut actor);
        self.actors.insert(actor);

        let result = (|| -> WorldResult<()> {
            place.admit(id, at, &mut self.actors)?;
            let wake = PlannedEvent::new(0, at, at, EventAction::Idle);
            if let Some(actor) = self.actors.get_mut(id) {
                actor.set_next_event(wake)?;
            }
            place.reschedule(id, &wake)?;
            Ok(())
        })();
        self.places.put(place);
        result?;
        self.enroll_place(place_id);
        Ok(id)
    }

    /// Mark an actor as the player.  The UI gate pauses when its events run.
    pub fn set_player(&mut self, actor: ActorId) {
        self.player = Some(actor);
    }

    // ── Enrollment ────────────────────────────────────────────────────────

    /// Re-derive and write this place's single world enrollment.
    pub(crate) fn enroll_place(&mut self, id: PlaceId) {
        let Some(place) = self.places.get_mut(id) else {
            return;
        };
        let due = place
            .next_due()
            .unwrap_or(self.global_time + TimeDuration::secs(self.config.max_idle_secs));
        // Re-enrollment may move the due later (events were consumed), which
        // the preemption rule would refuse; clear the tag first.
        self.place_sched.remove(id);
        self.place_sched.schedule(PlaceDue { place: id, due });
    }

    /// Roads out of `place`, as planner exits.  For an ephemeral transit
    /// stop these are the two halves of its road.
    pub(crate) fn exits_for(&self, place: PlaceId) -> Vec<RoadExit> {
        if let Some(&(road_id, progress)) = self.transit_stops.get(&place) {
            let Ok(road) = self.roads.get(road_id) else {
                return Vec::new();
            };
            let mut exits = Vec::new();
            if progress > 0.0 {
                exits.push(RoadExit {
                    road: road_id,
                    to: road.a,
                    length_km: progress * road.length_km,
                });
            }
            if progress < 1.0 {
                exits.push(RoadExit {
                    road: road_id,
                    to: road.b,
                    length_km: (1.0 - progress) * road.length_km,
                });
            }
            return exits;
        }
        self.roads
            .exits(place)
            .iter()
            .filter_map(|&road_id| {
                let road = self.roads.get(road_id).ok()?;
                let to = road.other_end(place)?;
                Some(RoadExit {
                    road: road_id,
                    to,
                    length_km: road.length_km,
                })
            })
            .collect()
    }

    // ── Audit ─────────────────────────────────────────────────────────────

    /// One live world enrollment per place (the global invariant).
    pub fn enrolled_places(&self) -> usize {
        self.place_sched.live_len()
    }

    pub fn in_transit(&self) -> usize {
        self.transit.len()
    }
}
