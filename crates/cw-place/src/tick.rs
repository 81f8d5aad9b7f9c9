//! Advancing a place: the guarded tick loop.
//!
//! # Phase order
//!
//! ```text
//! tick(deadline):
//!   guard on
//!   loop:
//!     peek next due; stop if past deadline
//!     fabricate arrivals owed up to that instant (may enqueue earlier events)
//!     dequeue the earliest live event; encounter_time := its end
//!     simulate the actor through it:  pre (once) → advance → post → re-plan
//!     sweep expired ultimatums at each 300 s boundary crossed
//!   fabricate the remainder of the window (quiet places still see traffic)
//!   notify the UI if the player was involved (may block; guard still on)
//!   guard off; report exactly one upward update
//! ```
//!
//! While the guard is on, every re-plan lands in the local scheduler only;
//! the world sees a single enrollment per tick regardless of how many
//! actors re-scheduled.

use cw_actor::{
    Actor, ActorStore, Commodity, EndState, EventAction, PlannedEvent, PlanCtx, ProposalSpec,
    RoadExit, Segment, SegmentKind,
};
use cw_core::{ActorId, PlaceEvent, Rng, TimeDuration, TimePoint};
use cw_interact::{
    expire_ultimatum, press_ultimatum, InteractError, PerformOutcome, Proposal,
};
use tracing::{debug, trace};

use crate::error::PlaceResult;
use crate::place::{ActorDue, Place};
use crate::report::{Departure, TickReport, TraceEntry};

// ── Collaborator seams ────────────────────────────────────────────────────────

/// UI collaborator hook, called mid-tick when the player's actor ran or
/// re-scheduled.  May block awaiting input.  The re-entrancy guard is still
/// on: anything the UI admits through [`Place::reschedule`] accumulates
/// locally like any other mid-tick re-plan.
pub trait EncounterGate {
    fn player_wake(&mut self, place: &mut Place, actors: &mut ActorStore, player: ActorId);
}

/// A gate that never pauses.
pub struct NoGate;

impl EncounterGate for NoGate {
    fn player_wake(&mut self, _place: &mut Place, _actors: &mut ActorStore, _player: ActorId) {}
}

/// Builds the actor behind a fabricated arrival.  The world layer supplies
/// an implementation backed by its role book; [`DriftSpawner`] is the
/// self-contained default.
pub trait ArrivalSpawner {
    fn spawn(&mut self, place: &Place, at: TimePoint, seed: Rng, actors: &mut ActorStore)
        -> ActorId;
}

/// Spawns generic drifters: a trading, wandering crawler with a modest
/// outfit drawn from its seed stream.
#[derive(Default)]
pub struct DriftSpawner;

impl ArrivalSpawner for DriftSpawner {
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
            .credit(Commodity::Fuel, 20 + outfit.next_bounded(80) as i64);
        actor
            .supplies
            .credit(Commodity::Scrap, outfit.next_bounded(200) as i64);
        actor
            .supplies
            .credit(Commodity::Rations, 10 + outfit.next_bounded(30) as i64);
        actor.segments.push(Segment::new(SegmentKind::Traction, 10, 30));
        actor.segments.push(Segment::new(SegmentKind::Storage, 10, 100));
        actor.segments.push(Segment::new(SegmentKind::Habitat, 10, 1));
        actor.attach(cw_actor::Component::trader(0.5));
        actor.attach(cw_actor::Component::nomad(1.0));
        actor.attach(cw_actor::Component::idler(TimeDuration::hours(1)));
        actors.insert(actor);
        id
    }
}

/// Everything a tick needs beyond the place itself.
pub struct TickCtx<'a> {
    pub actors: &'a mut ActorStore,
    /// Roads out of this place, precomputed by the world.
    pub exits: &'a [RoadExit],
    pub params: &'a crate::params::EncounterParams,
    pub player: Option<ActorId>,
    pub gate: &'a mut dyn EncounterGate,
    pub spawner: &'a mut dyn ArrivalSpawner,
}

// ── The tick ──────────────────────────────────────────────────────────────────

impl Place {
    /// Advance this place's local history up to `deadline`.
    pub fn tick(&mut self, deadline: TimePoint, ctx: &mut TickCtx<'_>) -> PlaceResult<TickReport> {
        debug_assert!(!self.is_ticking, "re-entrant place tick");
        self.is_ticking = true;
        let mut report = TickReport::default();

        loop {
            let Some(next_due) = self.sched.next_due() else {
                break;
            };
            if next_due > deadline {
                break;
            }

            self.fabricate_up_to(next_due, ctx, &mut report)?;

            let Some(due) = self.sched.dequeue() else {
                break;
            };
            if due.due > self.encounter_time {
                self.encounter_time = due.due;
            }
            self.run_actor_event(due, ctx, &mut report)?;
            self.sweep_expired(ctx, &mut report)?;
        }

        // Pending deadlines inside the window wake the place even with no
        // actor event due; each sweep recomputes the next pending deadline,
        // so this converges.
        while self.next_deadline.is_set() && self.next_deadline <= deadline {
            if self.next_deadline > self.encounter_time {
                self.encounter_time = self.next_deadline;
            }
            self.sweep_expired(ctx, &mut report)?;
        }

        self.fabricate_up_to(deadline, ctx, &mut report)?;

        // Housekeeping pulse for subscribed components.
        if !self.roster.is_empty() {
            self.publish(PlaceEvent::tick(self.encounter_time), ctx.actors);
        }

        if report.player_involved {
            if let Some(player) = ctx.player {
                ctx.gate.player_wake(self, ctx.actors, player);
            }
        }

        self.is_ticking = false;
        report.next_due = self.sched.next_due();
        Ok(report)
    }

    // ── Catch-up ──────────────────────────────────────────────────────────

    /// Fabricate and admit the dynamic arrivals owed over
    /// `[fabricated_to, target)`.
    fn fabricate_up_to(
        &mut self,
        target: TimePoint,
        ctx: &mut TickCtx<'_>,
        report: &mut TickReport,
    ) -> PlaceResult<()> {
        if target <= self.fabricated_to {
            return Ok(());
        }
        let prev = self.fabricated_to;
        self.fabricated_to = target;

        let arrivals = crate::catchup::fabricate_window(
            &mut self.rng,
            prev,
            target,
            self.encounter_time,
            ctx.params,
        );
        for arrival in arrivals {
            let seed = self.rng.seed();
            let id = ctx.spawner.spawn(self, arrival.at, seed, ctx.actors);
            self.admit(id, arrival.at, ctx.actors)?;
            if let Some(actor) = ctx.actors.get_mut(id) {
                let wake = PlannedEvent::new(0, arrival.at, arrival.at, EventAction::Idle);
                actor.set_next_event(wake)?;
                self.reschedule(id, &wake)?;
            }
            report.spawned.push(id);
            trace!(place = %self.id, %id, at = %arrival.at, "fabricated arrival");
        }
        Ok(())
    }

    // ── Simulate-through ──────────────────────────────────────────────────

    fn run_actor_event(
        &mut self,
        due: ActorDue,
        ctx: &mut TickCtx<'_>,
        report: &mut TickReport,
    ) -> PlaceResult<()> {
        let actor_id = due.actor;
        let Some(mut actor) = ctx.actors.take(actor_id) else {
            // Tag went stale between admission and dispatch (death cleanup).
            return Ok(());
        };
        let Some(event) = actor.next_event else {
            ctx.actors.put(actor);
            return Ok(());
        };

        report.trace.push(TraceEntry {
            time: event.end,
            actor: actor_id,
            label: event.label(),
            priority: event.priority,
        });
        if ctx.player == Some(actor_id) {
            report.player_involved = true;
        }

        // Begin effect, exactly once.
        if !event.pre_done {
            if let Some(pending) = actor.next_event.as_mut() {
                pending.pre_done = true;
            }
            self.apply_pre(&mut actor, &event, ctx);
        }

        actor.advance_to(event.end)?;
        actor.next_event = None;
        let stays = self.apply_post(&mut actor, &event, ctx, report)?;

        if stays && actor.alive() {
            // A completion effect may already have installed a follow-up
            // (busy after an exchange, a consequence wind-up); planning only
            // fills a vacancy.
            if actor.next_event.is_none() {
                let sightings = self.sightings_for(actor_id, ctx.actors);
                let plan_ctx = PlanCtx {
                    now: self.encounter_time,
                    place: self.id,
                    kind: self.kind,
                    wealth: self.wealth,
                    neighbors: ctx.exits,
                    others: &sightings,
                };
                actor.replan(&plan_ctx)?;
                if ctx.player == Some(actor_id) && actor.next_event.is_some() {
                    report.player_involved = true;
                }
            }
            if let Some(next) = actor.next_event {
                self.reschedule(actor_id, &next)?;
            }
        }

        let ended = actor.end_state.is_some();
        ctx.actors.put(actor);
        if ended {
            self.unhost(actor_id, self.encounter_time, ctx.actors);
        }
        Ok(())
    }

    /// Begin effects: announcements and telegraphed intent.
    fn apply_pre(&mut self, actor: &mut Actor, event: &PlannedEvent, ctx: &mut TickCtx<'_>) {
        match event.action {
            EventAction::Depart { .. } => {
                self.publish(PlaceEvent::leaving(actor.id, event.start), ctx.actors);
            }
            EventAction::Strike { at } => {
                let potential = actor.offense_rating() as i64;
                actor.relation_mut(at).add_potential_sent(potential);
            }
            _ => {}
        }
    }

    /// Completion effects.  Returns `false` when the actor is no longer
    /// hosted here (departed).
    fn apply_post(
        &mut self,
        actor: &mut Actor,
        event: &PlannedEvent,
        ctx: &mut TickCtx<'_>,
        report: &mut TickReport,
    ) -> PlaceResult<bool> {
        match event.action {
            EventAction::Idle | EventAction::Busy => Ok(true),

            EventAction::Depart { road, to } => {
                actor.location = cw_actor::Location::OnRoad(road);
                self.roster.retain(|&a| a != actor.id);
                self.publish(PlaceEvent::left(actor.id, event.end), ctx.actors);
                report.departures.push(Departure {
                    actor: actor.id,
                    road,
                    to,
                    at: event.end,
                });
                Ok(false)
            }

            EventAction::Trade { with, give, take } => {
                self.complete_trade(actor, with, give, take, ctx)?;
                Ok(true)
            }

            EventAction::Press { at, demand } => {
                if self.hosts(at) && ctx.actors.contains(at) {
                    let proposal = press_ultimatum(
                        actor,
                        at,
                        demand,
                        self.encounter_time,
                        ctx.params.ultimatum_timeout,
                    );
                    self.fold_deadline(proposal.expiration);
                }
                Ok(true)
            }

            EventAction::Strike { at } => {
                self.complete_strike(actor, at, ctx, report)?;
                Ok(true)
            }
        }
    }

    fn complete_trade(
        &mut self,
        mechanic: &mut Actor,
        with: ActorId,
        give: (Commodity, i64),
        take: (Commodity, i64),
        ctx: &mut TickCtx<'_>,
    ) -> PlaceResult<()> {
        if !self.hosts(with) {
            debug!(place = %self.id, partner = %with, "trade partner gone");
            return Ok(());
        }
        let Some(subject) = ctx.actors.get_mut(with) else {
            return Ok(());
        };

        let proposal = Proposal::open(ProposalSpec::Barter { give, take });
        let interactions = proposal.interactions(mechanic, subject);
        let Some(deal) = interactions.first() else {
            debug!(place = %self.id, partner = %with, "barter no longer capable");
            return Ok(());
        };

        match deal.perform(mechanic, subject, self.encounter_time) {
            Ok(PerformOutcome::Exchanged(outcome)) => {
                trace!(place = %self.id, at = %outcome.at, "exchange performed");
                if let Some(next) = subject.next_event {
                    self.reschedule(with, &next)?;
                }
                Ok(())
            }
            Ok(PerformOutcome::Refused) => Ok(()),
            // Disabled is recoverable: nothing mutated, nobody trades.
            Err(InteractError::Disabled(reason)) => {
                debug!(place = %self.id, reason, "trade fell through");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn complete_strike(
        &mut self,
        attacker: &mut Actor,
        at: ActorId,
        ctx: &mut TickCtx<'_>,
        report: &mut TickReport,
    ) -> PlaceResult<()> {
        if !self.hosts(at) {
            debug!(place = %self.id, target = %at, "strike target gone");
            return Ok(());
        }
        let mut target_ended = false;
        if let Some(subject) = ctx.actors.get_mut(at) {
            if subject.alive() {
                attacker.relation_mut(at).hostile = true;
                subject.relation_mut(attacker.id).hostile = true;

                let offense = attacker.offense_rating();
                if offense > 0 && !subject.segments.is_empty() {
                    let roll = attacker
                        .gauss
                        .sample(offense as f32, offense as f32 / 4.0)
                        .round() as i32;
                    let damage = roll.max(0);
                    let idx =
                        attacker.rng.next_bounded(subject.segments.len() as u64) as usize;
                    let applied = subject.segments[idx].apply_damage(damage) as i64;
                    attacker.relation_mut(at).add_inflicted(applied);
                    subject.relation_mut(attacker.id).add_taken(applied);

                    if subject.is_wrecked() {
                        subject.end(EndState::Destroyed);
                        target_ended = true;
                    }
                }
            }
        }
        if target_ended {
            report.ended.push(at);
            self.unhost(at, self.encounter_time, ctx.actors);
        }
        Ok(())
    }

    // ── Deadline sweep ────────────────────────────────────────────────────

    /// Fire the refusal consequence for every ultimatum whose deadline has
    /// passed the local clock, then recompute the earliest still-pending
    /// deadline.
    fn sweep_expired(
        &mut self,
        ctx: &mut TickCtx<'_>,
        report: &mut TickReport,
    ) -> PlaceResult<()> {
        if !self.next_deadline.is_set() || self.encounter_time < self.next_deadline {
            return Ok(());
        }

        // Collect expired pairs in roster order (relation keys sorted for
        // replayability), then act.
        let mut expired: Vec<(ActorId, ActorId)> = Vec::new();
        for &mechanic in &self.roster {
            if let Some(actor) = ctx.actors.get(mechanic) {
                let mut subjects: Vec<ActorId> = actor
                    .relations
                    .iter()
                    .filter(|(_, rel)| rel.deadline_expired(self.encounter_time))
                    .map(|(&subject, _)| subject)
                    .collect();
                subjects.sort_unstable();
                for subject in subjects {
                    expired.push((mechanic, subject));
                }
            }
        }

        for (mechanic_id, subject_id) in expired {
            let Some((mechanic, subject)) = ctx.actors.pair_mut(mechanic_id, subject_id) else {
                // Subject no longer exists; clear so the sweep converges.
                if let Some(mechanic) = ctx.actors.get_mut(mechanic_id) {
                    let rel = mechanic.relation_mut(subject_id);
                    rel.deadline = TimePoint::UNSET;
                    rel.take_ultimatum();
                }
                continue;
            };
            if expire_ultimatum(mechanic, subject, self.encounter_time)? {
                report.trace.push(TraceEntry {
                    time: self.encounter_time,
                    actor: mechanic_id,
                    label: "ultimatum.expired",
                    priority: 0,
                });
                if let Some(next) = mechanic.next_event {
                    self.reschedule(mechanic_id, &next)?;
                }
            }
        }

        // Earliest deadline still pending among hosted actors, if any.
        let mut earliest = TimePoint::UNSET;
        for &id in &self.roster {
            if let Some(actor) = ctx.actors.get(id) {
                for rel in actor.relations.values() {
                    if rel.deadline.is_set() && (!earliest.is_set() || rel.deadline < earliest) {
                        earliest = rel.deadline;
                    }
                }
            }
        }
        self.next_deadline = earliest;
        Ok(())
    }
}
