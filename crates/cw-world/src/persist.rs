//! Persistence: the Init/Data split and two-pass restoration.
//!
//! # What is (and is not) saved
//!
//! Each actor serializes as an **Init** part (name, role — enough to
//! rebuild its components from the role book) and a **Data** part (rng
//! word, Gaussian cache, clock, bags, segments, relations, knowledge, the
//! outstanding `next_event`).  Components are never serialized.  Neither
//! is any scheduler: every queue is re-derived on load by replaying each
//! actor's `next_event` through `Place::reschedule` and each mover's
//! arrival through the transit scheduler.
//!
//! # Reference encoding
//!
//! Saved references are names (actors, places) or graph indices (roads),
//! never raw ids: restoration allocates fresh ids in pass 1 and resolves
//! every reference by name lookup in pass 2.  A dangling name is a corrupt
//! save and refuses to load.

use cw_actor::{
    Actor, Bag, Commodity, EndState, EventAction, Location, PlannedEvent, PlaceKnowledge,
    Relation, Segment,
};
use cw_core::{ActorId, Coord, Gaussian, PlaceId, PlaceKind, Rng, RoadId, Terrain, TimePoint};
use cw_place::Place;
use cw_transit::Mover;
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};
use crate::world::World;

pub const SAVE_VERSION: u32 = 1;

// ── Save model ────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct WorldSave {
    pub version: u32,
    pub config: WorldConfig,
    pub global_time: TimePoint,
    pub rng_state: u64,
    pub places: Vec<PlaceSave>,
    pub roads: Vec<RoadSave>,
    pub actors: Vec<ActorSave>,
    pub movers: Vec<MoverSave>,
    pub convoys: Vec<ConvoySave>,
    pub transit_stops: Vec<StopSave>,
    pub player: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct PlaceSave {
    pub name: String,
    pub coord: Coord,
    pub terrain: Terrain,
    pub kind: PlaceKind,
    pub wealth: f32,
    pub population: u32,
    pub encounter_time: TimePoint,
    pub fabricated_to: TimePoint,
    pub rng_state: u64,
    pub roster: Vec<String>,
    pub next_deadline: TimePoint,
}

#[derive(Serialize, Deserialize)]
pub struct RoadSave {
    pub a: String,
    pub b: String,
    pub length_km: f64,
}

#[derive(Serialize, Deserialize)]
pub struct StopSave {
    pub place: String,
    pub road: u32,
    pub progress: f64,
}

#[derive(Serialize, Deserialize)]
pub struct ActorSave {
    pub init: ActorInit,
    pub data: ActorData,
}

/// Reconstruction half: identity and the component recipe key.
#[derive(Serialize, Deserialize)]
pub struct ActorInit {
    pub name: String,
    pub role: String,
}

/// Runtime half: everything that must restore bit-exactly.
#[derive(Serialize, Deserialize)]
pub struct ActorData {
    pub rng_state: u64,
    pub gauss: (u64, bool, f32),
    pub time: TimePoint,
    pub location: LocationSave,
    pub supplies: Bag,
    pub cargo: Bag,
    pub segments: Vec<Segment>,
    pub relations: Vec<RelationSave>,
    pub knowledge: Vec<KnowledgeSave>,
    pub next_event: Option<EventSave>,
    pub end_state: Option<EndState>,
}

#[derive(Serialize, Deserialize)]
pub enum LocationSave {
    Nowhere,
    At(String),
    OnRoad(u32),
}

#[derive(Serialize, Deserialize)]
pub struct RelationSave {
    pub other: String,
    pub relation: Relation,
}

#[derive(Serialize, Deserialize)]
pub struct KnowledgeSave {
    pub place: String,
    pub knowledge: PlaceKnowledge,
}

#[derive(Serialize, Deserialize)]
pub struct EventSave {
    pub priority: i32,
    pub start: TimePoint,
    pub end: TimePoint,
    pub pre_done: bool,
    pub action: ActionSave,
}

#[derive(Serialize, Deserialize)]
pub enum ActionSave {
    Idle,
    Busy,
    Depart { road: u32, to: String },
    Trade { with: String, give: (Commodity, i64), take: (Commodity, i64) },
    Press { at: String, demand: (Commodity, i64) },
    Strike { at: String },
}

#[derive(Serialize, Deserialize)]
pub struct MoverSave {
    pub actor: String,
    pub road: u32,
    pub progress: f64,
    pub direction: i8,
    pub departed: TimePoint,
    pub speed_kph: f64,
}

#[derive(Serialize, Deserialize)]
pub struct ConvoySave {
    pub leader: String,
    pub members: Vec<String>,
    pub place: Option<String>,
    pub road: Option<u32>,
}

// ── Save ──────────────────────────────────────────────────────────────────────

impl World {
    pub fn to_save(&self) -> WorldSave {
        let actor_name = |id: ActorId| -> String {
            self.actors
                .get(id)
                .map_or_else(String::new, |a| a.name.clone())
        };
        let place_name = |id: PlaceId| -> String {
            self.places
                .get(id)
                .map_or_else(String::new, |p| p.name.clone())
        };

        let places = self
            .places
            .ids_sorted()
            .into_iter()
            .filter_map(|id| self.places.get(id))
            .map(|p| PlaceSave {
                name: p.name.clone(),
                coord: p.coord,
                terrain: p.terrain,
                kind: p.kind,
                wealth: p.wealth,
                population: p.population,
                encounter_time: p.encounter_time,
                fabricated_to: p.fabricated_to(),
                rng_state: p.rng.state(),
                roster: p.roster().iter().map(|&a| actor_name(a)).collect(),
                next_deadline: p.pending_deadline(),
            })
            .collect();

        let roads = self
            .roads
            .iter()
            .map(|r| RoadSave {
                a: place_name(r.a),
                b: place_name(r.b),
                length_km: r.length_km,
            })
            .collect();

        let actors = self
            .actors
            .ids_sorted()
            .into_iter()
            .filter_map(|id| self.actors.get(id))
            .map(|a| self.save_actor(a))
            .collect();

        let mut mover_ids: Vec<ActorId> = self.transit.iter().map(|(&id, _)| id).collect();
        mover_ids.sort_unstable();
        let movers = mover_ids
            .into_iter()
            .filter_map(|id| self.transit.get(id))
            .map(|m| MoverSave {
                actor: actor_name(m.actor),
                road: m.road.0,
                progress: m.progress,
                direction: m.direction,
                departed: m.departed,
                speed_kph: m.speed_kph,
            })
            .collect();

        let mut convoys: Vec<ConvoySave> = self
            .convoys
            .iter()
            .map(|c| ConvoySave {
                leader: actor_name(c.leader),
                members: c.members.iter().map(|&m| actor_name(m)).collect(),
                place: c.place.map(place_name),
                road: c.road.map(|r| r.0),
            })
            .collect();
        convoys.sort_by(|x, y| x.leader.cmp(&y.leader));

        let mut transit_stops: Vec<StopSave> = self
            .transit_stops
            .iter()
            .map(|(&place, &(road, progress))| StopSave {
                place: place_name(place),
                road: road.0,
                progress,
            })
            .collect();
        transit_stops.sort_by(|x, y| x.place.cmp(&y.place));

        WorldSave {
            version: SAVE_VERSION,
            config: self.config.clone(),
            global_time: self.global_time,
            rng_state: self.rng.state(),
            places,
            roads,
            actors,
            movers,
            convoys,
            transit_stops,
            player: self.player.map(actor_name),
        }
    }

    fn save_actor(&self, a: &Actor) -> ActorSave {
        let actor_name = |id: ActorId| -> String {
            self.actors
                .get(id)
                .map_or_else(String::new, |x| x.name.clone())
        };
        let place_name = |id: PlaceId| -> String {
            self.places
                .get(id)
                .map_or_else(String::new, |p| p.name.clone())
        };

        let mut relations: Vec<RelationSave> = a
            .relations
            .iter()
            .map(|(&other, relation)| RelationSave {
                other: actor_name(other),
                relation: relation.clone(),
            })
            .collect();
        relations.sort_by(|x, y| x.other.cmp(&y.other));

        let mut knowledge: Vec<KnowledgeSave> = a
            .knowledge
            .iter()
            .map(|(&place, &knowledge)| KnowledgeSave {
                place: place_name(place),
                knowledge,
            })
            .collect();
        knowledge.sort_by(|x, y| x.place.cmp(&y.place));

        let next_event = a.next_event.map(|e| EventSave {
            priority: e.priority,
            start: e.start,
            end: e.end,
            pre_done: e.pre_done,
            action: match e.action {
                EventAction::Idle => ActionSave::Idle,
                EventAction::Busy => ActionSave::Busy,
                EventAction::Depart { road, to } => ActionSave::Depart {
                    road: road.0,
                    to: place_name(to),
                },
                EventAction::Trade { with, give, take } => ActionSave::Trade {
                    with: actor_name(with),
                    give,
                    take,
                },
                EventAction::Press { at, demand } => ActionSave::Press {
                    at: actor_name(at),
                    demand,
                },
                EventAction::Strike { at } => ActionSave::Strike { at: actor_name(at) },
            },
        });

        ActorSave {
            init: ActorInit {
                name: a.name.clone(),
                role: a.role.clone(),
            },
            data: ActorData {
                rng_state: a.rng.state(),
                gauss: a.gauss.parts(),
                time: a.time,
                location: match a.location {
                    Location::Nowhere => LocationSave::Nowhere,
                    Location::At(p) => LocationSave::At(place_name(p)),
                    Location::OnRoad(r) => LocationSave::OnRoad(r.0),
                },
                supplies: a.supplies.clone(),
                cargo: a.cargo.clone(),
                segments: a.segments.clone(),
                relations,
                knowledge,
                next_event,
                end_state: a.end_state,
            },
        }
    }

    // ── Restore ───────────────────────────────────────────────────────────

    /// Rebuild a world from a save.
    ///
    /// Pass 1 creates every actor by name and every place; pass 2 resolves
    /// all name references and replays each actor's `next_event` into the
    /// schedulers.
    pub fn from_save(save: WorldSave) -> WorldResult<World> {
        if save.version != SAVE_VERSION {
            return Err(WorldError::CorruptSave(format!(
                "save version {} (expected {})",
                save.version, SAVE_VERSION
            )));
        }

        let mut world = World::new(save.config.clone());
        world.global_time = save.global_time;
        world.rng = Rng::from_state(save.rng_state);

        // ── Pass 1: actors by name ────────────────────────────────────────
        for s in &save.actors {
            let id = world.actors.alloc_id();
            let mut actor = Actor::new(
                id,
                s.init.name.clone(),
                s.init.role.clone(),
                Rng::from_state(s.data.rng_state),
                s.data.time,
            );
            let (g_state, g_primed, g_cached) = s.data.gauss;
            actor.gauss = Gaussian::from_parts(g_state, g_primed, g_cached);
            actor.supplies = s.data.supplies.clone();
            actor.cargo = s.data.cargo.clone();
            actor.segments = s.data.segments.clone();
            actor.end_state = s.data.end_state;
            world.roles.outfit(&s.init.role, &mut actor);
            world.actors.insert(actor);
        }

        // ── Pass 1: places (rosters resolve actor names) ──────────────────
        for s in &save.places {
            let id = world.places.alloc_id();
            let roster = s
                .roster
                .iter()
                .map(|name| lookup_actor(&world, name))
                .collect::<WorldResult<Vec<ActorId>>>()?;
            let place = Place::from_parts(
                id,
                s.name.clone(),
                s.coord,
                s.terrain,
                s.kind,
                s.wealth,
                s.population,
                s.encounter_time,
                s.fabricated_to,
                Rng::from_state(s.rng_state),
                roster,
                s.next_deadline,
            );
            world.places.insert(place);
        }

        // ── Roads (by endpoint name, index order preserved) ───────────────
        for s in &save.roads {
            let a = lookup_place(&world, &s.a)?;
            let b = lookup_place(&world, &s.b)?;
            world.roads.add_road(a, b, s.length_km);
        }

        for s in &save.transit_stops {
            let place = lookup_place(&world, &s.place)?;
            world
                .transit_stops
                .insert(place, (road_id(&world, s.road)?, s.progress));
        }

        // ── Pass 2: resolve actor references ──────────────────────────────
        for s in &save.actors {
            let id = lookup_actor(&world, &s.init.name)?;
            let location = match &s.data.location {
                LocationSave::Nowhere => Location::Nowhere,
                LocationSave::At(name) => Location::At(lookup_place(&world, name)?),
                LocationSave::OnRoad(road) => Location::OnRoad(road_id(&world, *road)?),
            };
            let relations = s
                .data
                .relations
                .iter()
                .map(|r| Ok((lookup_actor(&world, &r.other)?, r.relation.clone())))
                .collect::<WorldResult<Vec<_>>>()?;
            let knowledge = s
                .data
                .knowledge
                .iter()
                .map(|k| Ok((lookup_place(&world, &k.place)?, k.knowledge)))
                .collect::<WorldResult<Vec<_>>>()?;
            let next_event = match &s.data.next_event {
                None => None,
                Some(e) => Some(restore_event(&world, e)?),
            };

            let Some(actor) = world.actors.get_mut(id) else {
                continue;
            };
            actor.location = location;
            actor.relations = relations.into_iter().collect();
            actor.knowledge = knowledge.into_iter().collect();
            actor.next_event = next_event;
        }

        // ── Movers & convoys ──────────────────────────────────────────────
        for s in &save.movers {
            let actor = lookup_actor(&world, &s.actor)?;
            let road = road_id(&world, s.road)?;
            let mover = Mover {
                actor,
                road,
                progress: s.progress,
                direction: s.direction,
                departed: s.departed,
                speed_kph: s.speed_kph,
            };
            let arrival = mover.arrival_time(world.roads.get(road)?);
            world.road_watch.entry(road).or_insert(s.departed);
            world.transit.insert(mover)?;
            world
                .transit_sched
                .schedule(crate::world::TransitDue { actor, due: arrival });
        }

        for s in &save.convoys {
            let leader = lookup_actor(&world, &s.leader)?;
            let members = s
                .members
                .iter()
                .map(|m| lookup_actor(&world, m))
                .collect::<WorldResult<Vec<_>>>()?;
            let place = match &s.place {
                Some(name) => Some(lookup_place(&world, name)?),
                None => None,
            };
            let road = match s.road {
                Some(r) => Some(road_id(&world, r)?),
                None => None,
            };
            world.convoys.restore(leader, members, place, road);
        }

        world.player = match &save.player {
            Some(name) => Some(lookup_actor(&world, name)?),
            None => None,
        };

        // ── Replay schedulers from actor state ────────────────────────────
        let actor_ids = world.actors.ids_sorted();
        for id in actor_ids {
            let Some(actor) = world.actors.get(id) else {
                continue;
            };
            let (Some(event), Location::At(pid)) = (actor.next_event, actor.location) else {
                continue;
            };
            let Some(place) = world.places.get_mut(pid) else {
                continue;
            };
            place.reschedule(id, &event)?;
        }
        for pid in world.places.ids_sorted() {
            world.enroll_place(pid);
        }

        Ok(world)
    }

    // ── File round-trip ───────────────────────────────────────────────────

    pub fn save_to_path(&self, path: &std::path::Path) -> WorldResult<()> {
        let json = serde_json::to_string_pretty(&self.to_save())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_path(path: &std::path::Path) -> WorldResult<World> {
        let json = std::fs::read_to_string(path)?;
        let save: WorldSave = serde_json::from_str(&json)
            .map_err(|e| WorldError::CorruptSave(e.to_string()))?;
        World::from_save(save)
    }
}

// ── Lookup helpers ────────────────────────────────────────────────────────────

fn lookup_actor(world: &World, name: &str) -> WorldResult<ActorId> {
    world
        .actors
        .lookup(name)
        .ok_or_else(|| WorldError::CorruptSave(format!("unknown actor '{name}'")))
}

fn lookup_place(world: &World, name: &str) -> WorldResult<PlaceId> {
    world
        .places
        .lookup(name)
        .ok_or_else(|| WorldError::CorruptSave(format!("unknown place '{name}'")))
}

fn road_id(world: &World, index: u32) -> WorldResult<RoadId> {
    let id = RoadId(index);
    if (index as usize) < world.roads.road_count() {
        Ok(id)
    } else {
        Err(WorldError::CorruptSave(format!("unknown road {index}")))
    }
}

fn restore_event(world: &World, e: &EventSave) -> WorldResult<PlannedEvent> {
    let action = match &e.action {
        ActionSave::Idle => EventAction::Idle,
        ActionSave::Busy => EventAction::Busy,
        ActionSave::Depart { road, to } => EventAction::Depart {
            road: road_id(world, *road)?,
            to: lookup_place(world, to)?,
        },
        ActionSave::Trade { with, give, take } => EventAction::Trade {
            with: lookup_actor(world, with)?,
            give: *give,
            take: *take,
        },
        ActionSave::Press { at, demand } => EventAction::Press {
            at: lookup_actor(world, at)?,
            demand: *demand,
        },
        ActionSave::Strike { at } => EventAction::Strike {
            at: lookup_actor(world, at)?,
        },
    };
    Ok(PlannedEvent {
        priority: e.priority,
        start: e.start,
        end: e.end,
        action,
        pre_done: e.pre_done,
    })
}
