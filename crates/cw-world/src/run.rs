//! The main loop: dispatching the place/transit scheduler pair.

use cw_actor::{Actor, ActorStore, EndState, EventAction, PlannedEvent};
use cw_core::{ActorId, CoreError, PlaceId, Rng, TimePoint};
use cw_place::{ArrivalSpawner, Departure, Place, TickCtx};
use cw_transit::{detect_crossings, Contact, Mover, Road};
use tracing::{debug, error, trace};

use crate::error::WorldResult;
use crate::gate::BridgeGate;
use crate::observer::WorldObserver;
use crate::ui::UiBridge;
use crate::world::{TransitDue, World};

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Why a run stopped.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EndReason {
    /// The player's actor reached an end state.
    PlayerEnded(EndState),
    /// The UI asked to quit.
    Quit,
}

/// Result of one [`World::step`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    /// One event was dispatched.
    Advanced,
    /// Nothing is scheduled anywhere.
    Quiescent,
    /// The UI asked for a save; the caller owns serialization.
    SaveRequested,
    Ended(EndReason),
}

/// Result of a [`World::run`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunExit {
    HorizonReached,
    Quiescent,
    SaveRequested,
    Ended(EndReason),
}

// ── Fabrication spawner backed by the role book ───────────────────────────────

/// Spawns fabricated arrivals through the world's role book, so catch-up
/// drifters carry the same component recipe as any other "drifter".
pub(crate) struct RoleSpawner<'a> {
    pub roles: &'a crate::roles::RoleBook,
}

impl ArrivalSpawner for RoleSpawner<'_> {
    fn spawn(
        &mut self,
        _place: &Place,
        at: TimePoint,
        seed: Rng,
        actors: &mut ActorStore,
    ) -> ActorId {
        let id = actors.alloc_id();
        let mut outfit = seed.derive("outfit");
        let mut actor = Actor::new(id, format!("drifter-{}", id.0), "drifter", seed, at);
        actor
            .supplies
            .credit(cw_actor::Commodity::Fuel, 20 + outfit.next_bounded(80) as i64);
        actor
            .supplies
            .credit(cw_actor::Commodity::Scrap, outfit.next_bounded(200) as i64);
        actor
            .supplies
            .credit(cw_actor::Commodity::Rations, 10 + outfit.next_bounded(30) as i64);
        actor
            .segments
            .push(cw_actor::Segment::new(cw_actor::SegmentKind::Traction, 10, 30));
        actor
            .segments
            .push(cw_actor::Segment::new(cw_actor::SegmentKind::Storage, 10, 100));
        actor
            .segments
            .push(cw_actor::Segment::new(cw_actor::SegmentKind::Habitat, 10, 1));
        self.roles.outfit("drifter", &mut actor);
        actors.insert(actor);
        id
    }
}

// ── The loop ──────────────────────────────────────────────────────────────────

impl World {
    /// Due time of the next dispatch across both schedulers, if any.
    pub fn next_dispatch_due(&mut self) -> Option<TimePoint> {
        let t = self.transit_sched.next_due();
        let p = self.place_sched.next_due();
        match (t, p) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run until `until`, an end condition, quiescence, or a save request.
    pub fn run(
        &mut self,
        until: TimePoint,
        ui: &mut dyn UiBridge,
        observer: &mut dyn WorldObserver,
    ) -> WorldResult<RunExit> {
        loop {
            match self.next_dispatch_due() {
                None => {
                    observer.on_world_end(self.global_time);
                    return Ok(RunExit::Quiescent);
                }
                Some(due) if due > until => {
                    self.global_time = until;
                    observer.on_world_end(self.global_time);
                    return Ok(RunExit::HorizonReached);
                }
                Some(_) => {}
            }
            match self.step(ui, observer)? {
                StepOutcome::Advanced | StepOutcome::Quiescent => {}
                StepOutcome::SaveRequested => return Ok(RunExit::SaveRequested),
                StepOutcome::Ended(reason) => {
                    observer.on_world_end(self.global_time);
                    return Ok(RunExit::Ended(reason));
                }
            }
        }
    }

    /// Dispatch exactly one event: the sooner of the two schedulers, ties
    /// going to transit (travel causality first).
    pub fn step(
        &mut self,
        ui: &mut dyn UiBridge,
        observer: &mut dyn WorldObserver,
    ) -> WorldResult<StepOutcome> {
        if let Some(reason) = self.end_reason() {
            return Ok(StepOutcome::Ended(reason));
        }

        let t_due = self.transit_sched.next_due();
        let p_due = self.place_sched.next_due();
        match (t_due, p_due) {
            (None, None) => return Ok(StepOutcome::Quiescent),
            (Some(t), Some(p)) if t <= p => self.dispatch_transit(observer)?,
            (Some(_), None) => self.dispatch_transit(observer)?,
            _ => self.dispatch_place(ui, observer)?,
        }

        if let Some(reason) = self.end_reason() {
            return Ok(StepOutcome::Ended(reason));
        }
        if self.save_requested {
            self.save_requested = false;
            return Ok(StepOutcome::SaveRequested);
        }
        Ok(StepOutcome::Advanced)
    }

    fn end_reason(&self) -> Option<EndReason> {
        if self.quit {
            return Some(EndReason::Quit);
        }
        let player = self.player?;
        let state = self.actors.get(player)?.end_state?;
        Some(EndReason::PlayerEnded(state))
    }

    // ── Place dispatch ────────────────────────────────────────────────────

    fn dispatch_place(
        &mut self,
        ui: &mut dyn UiBridge,
        observer: &mut dyn WorldObserver,
    ) -> WorldResult<()> {
        let Some(enrolled) = self.place_sched.dequeue() else {
            return Ok(());
        };
        if enrolled.due > self.global_time {
            self.global_time = enrolled.due;
        }
        let pid = enrolled.place;
        let Some(mut place) = self.places.take(pid) else {
            return Ok(());
        };

        let exits = self.exits_for(pid);
        let params = self.params.clone();
        let report;
        let quit;
        let save;
        {
            let mut spawner = RoleSpawner { roles: &self.roles };
            let mut gate = BridgeGate::new(ui, &self.places, &exits);
            {
                let mut ctx = TickCtx {
                    actors: &mut self.actors,
                    exits: &exits,
                    params: &params,
                    player: self.player,
                    gate: &mut gate,
                    spawner: &mut spawner,
                };
                report = place.tick(self.global_time, &mut ctx);
            }
            quit = gate.quit;
            save = gate.save;
        }
        let report = match report {
            Ok(report) => report,
            Err(err) => {
                // Contract violations are fatal; still leave the store sane.
                error!(place = %pid, %err, "place tick failed");
                self.places.put(place);
                return Err(err.into());
            }
        };

        for entry in &report.trace {
            observer.on_event(pid, entry);
        }
        for &ended in &report.ended {
            self.convoys.leave(ended);
        }
        let departures = report.departures.clone();
        self.places.put(place);

        for departure in departures {
            self.depart_actor(departure, pid)?;
        }

        // Ephemeral stops dissolve once everyone has moved on.
        let dissolve = self.transit_stops.contains_key(&pid)
            && self.places.get(pid).is_some_and(|p| p.roster().is_empty());
        if dissolve {
            trace!(place = %pid, "transit stop dissolved");
            self.places.remove(pid);
            self.place_sched.remove(pid);
            self.transit_stops.remove(&pid);
        } else {
            self.enroll_place(pid);
        }

        if quit {
            self.quit = true;
        }
        if save {
            self.save_requested = true;
        }
        Ok(())
    }

    // ── Transit dispatch ──────────────────────────────────────────────────

    fn dispatch_transit(&mut self, observer: &mut dyn WorldObserver) -> WorldResult<()> {
        let Some(TransitDue { actor: actor_id, due }) = self.transit_sched.dequeue() else {
            return Ok(());
        };
        if due > self.global_time {
            self.global_time = due;
        }
        let Some(mover) = self.transit.get(actor_id).copied() else {
            // Promoted into a transit stop after enrollment; nothing to do.
            return Ok(());
        };
        let road = *self.roads.get(mover.road)?;

        self.contact_sweep(&road, self.global_time)?;
        if !self.transit.is_in_transit(actor_id) {
            // The sweep pulled this very mover into a mid-road encounter.
            return Ok(());
        }

        let mover = self.transit.remove(actor_id)?;
        let dest = mover.destination(&road);
        observer.on_arrival(actor_id, road.id, self.global_time);
        if let Some(convoy) = self.convoys.of_actor(actor_id) {
            let id = convoy.id;
            if convoy.leader == actor_id {
                self.convoys.into_place(id, dest);
            }
        }
        self.host_actor(actor_id, dest, self.global_time)
    }

    /// Register a departure reported by a place tick: build the mover,
    /// watch the road, and enroll the arrival.
    fn depart_actor(&mut self, departure: Departure, from: PlaceId) -> WorldResult<()> {
        let Departure {
            actor, road, to, at,
        } = departure;
        let road_data = *self.roads.get(road)?;
        let speed = self.actors.get(actor).map_or(1.0, Actor::speed_kph);

        let mover = match self.transit_stops.get(&from) {
            Some(&(stop_road, progress)) if stop_road == road => {
                Mover::resume(actor, &road_data, progress, to, at, speed)?
            }
            _ => Mover::depart(actor, &road_data, from, at, speed)?,
        };
        let arrival = mover.arrival_time(&road_data);
        self.road_watch.entry(road).or_insert(at);
        self.transit.insert(mover)?;
        self.transit_sched.schedule(TransitDue { actor, due: arrival });
        debug!(%actor, %road, %arrival, "departed");

        if let Some(convoy) = self.convoys.of_actor(actor) {
            let (id, leader, solo) = (convoy.id, convoy.leader, convoy.members.len() == 1);
            if leader == actor && solo {
                self.convoys.onto_road(id, road);
            } else {
                // Splitting from a convoy mid-journey dissolves membership.
                self.convoys.leave(actor);
            }
        }
        Ok(())
    }

    /// Admit an actor into a place with a fresh wake event, and re-enroll
    /// the place.  `at_least` is the earliest admissible instant; a place
    /// whose clock runs ahead hosts the actor at its own local now.
    fn host_actor(
        &mut self,
        actor_id: ActorId,
        place_id: PlaceId,
        at_least: TimePoint,
    ) -> WorldResult<()> {
        let Some(mut place) = self.places.take(place_id) else {
            return Err(CoreError::PlaceNotFound(place_id).into());
        };
        let result = (|| -> WorldResult<()> {
            let at = place.encounter_time.max(at_least);
            if let Some(actor) = self.actors.get_mut(actor_id) {
                actor.advance_to(at)?;
            }
            place.admit(actor_id, at, &mut self.actors)?;
            let wake = PlannedEvent::new(0, at, at, EventAction::Idle);
            if let Some(actor) = self.actors.get_mut(actor_id) {
                actor.set_next_event(wake)?;
            }
            place.reschedule(actor_id, &wake)?;
            Ok(())
        })();
        self.places.put(place);
        result?;
        self.enroll_place(place_id);
        Ok(())
    }

    // ── Contact detection ─────────────────────────────────────────────────

    /// Detect and promote mid-road crossings on `road` since the last
    /// observation.
    fn contact_sweep(&mut self, road: &Road, now: TimePoint) -> WorldResult<()> {
        let prev = self.road_watch.get(&road.id).copied().unwrap_or(now);
        self.road_watch.insert(road.id, now);
        if prev >= now {
            return Ok(());
        }

        let ids: Vec<ActorId> = self.transit.on_road(road.id).to_vec();
        let movers: Vec<&Mover> = ids.iter().filter_map(|&a| self.transit.get(a)).collect();
        let contacts = detect_crossings(road, &movers, prev, now);
        for contact in contacts {
            self.promote_contact(road, contact)?;
        }
        Ok(())
    }

    /// Pull both parties of a crossing into an ephemeral transit place
    /// keyed by `(road, quantized progress)`.
    fn promote_contact(&mut self, road: &Road, contact: Contact) -> WorldResult<()> {
        if !self.transit.is_in_transit(contact.a) || !self.transit.is_in_transit(contact.b) {
            // An earlier contact this sweep already pulled one of them off.
            return Ok(());
        }

        let name = format!("r{}-mile{}", road.id.0, contact.progress_key());
        let stop_id = match self.places.lookup(&name) {
            Some(id) => id,
            None => {
                let id = self.places.alloc_id();
                let coord = {
                    let a = self.places.get(road.a).map(|p| p.coord).unwrap_or_default();
                    let b = self.places.get(road.b).map(|p| p.coord).unwrap_or_default();
                    cw_core::Coord::new(
                        a.x + (b.x - a.x) * contact.progress,
                        a.y + (b.y - a.y) * contact.progress,
                    )
                };
                let stop = Place::transit_stop(
                    id,
                    &name,
                    coord,
                    contact.time,
                    &self.rng / ("stop", name.as_str()),
                );
                self.places.insert(stop);
                self.transit_stops.insert(id, (road.id, contact.progress));
                id
            }
        };
        debug!(road = %road.id, stop = %stop_id, at = %contact.time, "mid-road contact");

        for actor_id in [contact.a, contact.b] {
            self.transit.remove(actor_id)?;
            self.transit_sched.remove(actor_id);
            self.host_actor(actor_id, stop_id, contact.time)?;
        }
        Ok(())
    }
}
