//! The `Place` node and its local scheduler.

use cw_actor::{Actor, ActorStore, PlannedEvent, Sighting};
use cw_core::dist::poisson_quantile;
use cw_core::{
    ActorId, Coord, CoreError, PlaceEvent, PlaceId, PlaceKind, Rng, Terrain, TimeDuration,
    TimePoint,
};
use cw_schedule::{Admission, QueueEvent, Scheduler};
use tracing::trace;

use crate::error::PlaceResult;
use crate::params::EncounterParams;

// ── ActorDue ──────────────────────────────────────────────────────────────────

/// One entry in a place's actor scheduler: a mirror of the tagged actor's
/// current `next_event` ordering key.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ActorDue {
    pub actor: ActorId,
    pub due: TimePoint,
    pub priority: i32,
}

impl QueueEvent for ActorDue {
    type Tag = ActorId;

    fn tag(&self) -> ActorId {
        self.actor
    }
    fn due(&self) -> TimePoint {
        self.due
    }
    fn priority(&self) -> i32 {
        self.priority
    }
}

// ── Place ─────────────────────────────────────────────────────────────────────

/// A geographic node hosting actors and its own local scheduler.
///
/// # Clock invariants
///
/// - `encounter_time` is monotonically non-decreasing and never exceeds the
///   deadline of the tick that advanced it.
/// - Every live scheduler entry has `due >= encounter_time`.
/// - `fabricated_to` trails `encounter_time`: the interval between them is
///   what catch-up still owes this place.
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub coord: Coord,
    pub terrain: Terrain,
    pub kind: PlaceKind,
    pub wealth: f32,
    pub population: u32,

    /// The place's local "now".
    pub encounter_time: TimePoint,
    /// Catch-up base: dynamic arrivals have been fabricated up to here.
    pub(crate) fabricated_to: TimePoint,
    /// Hosted actors, in admission order (the fan-out order).
    pub(crate) roster: Vec<ActorId>,
    pub(crate) sched: Scheduler<ActorDue>,
    /// The place's own stochastic stream (offsets, fabrication).
    pub rng: Rng,
    /// Guard: actor re-plans during a tick stay local while this is set.
    pub(crate) is_ticking: bool,
    /// Earliest pending ultimatum deadline among hosted actors, or UNSET.
    /// The place enrolls itself for this instant so sweeps land on time.
    pub(crate) next_deadline: TimePoint,
}

impl Place {
    /// Create a place first observed at `global_time`.
    ///
    /// Its clock is set *in the past*: a uniform offset plus the 95th
    /// percentile of hourly arrivals (in hours) back from global time, so
    /// retroactive fabrication has room to populate it before it first
    /// ticks.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PlaceId,
        name: impl Into<String>,
        coord: Coord,
        terrain: Terrain,
        kind: PlaceKind,
        wealth: f32,
        population: u32,
        global_time: TimePoint,
        mut rng: Rng,
        params: &EncounterParams,
    ) -> Self {
        let offset = rng.next_bounded(params.initial_offset_secs.max(1) as u64) as i64;
        let allowance_hours = poisson_quantile(params.arrivals_per_hour, 0.95) as i64;
        let encounter_time = global_time
            - TimeDuration::secs(offset)
            - TimeDuration::hours(allowance_hours);
        Place {
            id,
            name: name.into(),
            coord,
            terrain,
            kind,
            wealth,
            population,
            encounter_time,
            fabricated_to: encounter_time,
            roster: Vec::new(),
            sched: Scheduler::new(),
            rng,
            is_ticking: false,
            next_deadline: TimePoint::UNSET,
        }
    }

    /// An ephemeral encounter spot (mid-road contact).  Its clock starts at
    /// the contact instant; there is no catch-up history to fabricate.
    pub fn transit_stop(
        id: PlaceId,
        name: impl Into<String>,
        coord: Coord,
        at: TimePoint,
        rng: Rng,
    ) -> Self {
        Place {
            id,
            name: name.into(),
            coord,
            terrain: Terrain::Flats,
            kind: PlaceKind::Transit,
            wealth: 0.0,
            population: 0,
            encounter_time: at,
            fabricated_to: at,
            roster: Vec::new(),
            sched: Scheduler::new(),
            rng,
            is_ticking: false,
            next_deadline: TimePoint::UNSET,
        }
    }

    /// Rebuild a place from persisted state.  Rosters are re-attached
    /// silently (no `Arrived` fan-out); the caller replays scheduler
    /// entries from each actor's `next_event` afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PlaceId,
        name: impl Into<String>,
        coord: Coord,
        terrain: Terrain,
        kind: PlaceKind,
        wealth: f32,
        population: u32,
        encounter_time: TimePoint,
        fabricated_to: TimePoint,
        rng: Rng,
        roster: Vec<ActorId>,
        next_deadline: TimePoint,
    ) -> Self {
        Place {
            id,
            name: name.into(),
            coord,
            terrain,
            kind,
            wealth,
            population,
            encounter_time,
            fabricated_to,
            roster,
            sched: Scheduler::new(),
            rng,
            is_ticking: false,
            next_deadline,
        }
    }

    /// Catch-up base, for persistence.
    pub fn fabricated_to(&self) -> TimePoint {
        self.fabricated_to
    }

    /// Earliest pending ultimatum deadline, for persistence.
    pub fn pending_deadline(&self) -> TimePoint {
        self.next_deadline
    }

    // ── Roster ────────────────────────────────────────────────────────────

    pub fn roster(&self) -> &[ActorId] {
        &self.roster
    }

    pub fn hosts(&self, actor: ActorId) -> bool {
        self.roster.contains(&actor)
    }

    /// Admit `actor` at `at`: roster, location, knowledge, `Arrived`
    /// fan-out.  Admitting behind the local clock is a contract violation.
    pub fn admit(&mut self, actor: ActorId, at: TimePoint, actors: &mut ActorStore) -> PlaceResult<()> {
        if at < self.encounter_time {
            return Err(CoreError::LateAdmission {
                actor,
                place: self.id,
                at,
                encounter: self.encounter_time,
            }
            .into());
        }
        if let Some(a) = actors.get_mut(actor) {
            a.location = cw_actor::Location::At(self.id);
            match a.knowledge.get_mut(&self.id) {
                Some(k) => k.revisit(at, self.wealth),
                None => {
                    a.knowledge
                        .insert(self.id, cw_actor::PlaceKnowledge::first_visit(at, self.wealth));
                }
            }
            // A newcomer may carry pending ultimatums; their deadlines
            // become this place's problem.
            for rel in a.relations.values() {
                if rel.deadline.is_set() {
                    self.fold_deadline(rel.deadline);
                }
            }
        }
        self.roster.push(actor);
        self.publish(PlaceEvent::arrived(actor, at), actors);
        trace!(place = %self.id, %actor, %at, "admitted");
        Ok(())
    }

    /// Lower `next_deadline` to `deadline` if it is earlier (UNSET-aware).
    pub(crate) fn fold_deadline(&mut self, deadline: TimePoint) {
        if !deadline.is_set() {
            return;
        }
        if !self.next_deadline.is_set() || deadline < self.next_deadline {
            self.next_deadline = deadline;
        }
    }

    /// Unhost `actor` (departure completed or death).  Publishes `Left`
    /// and drops any live scheduler entry.
    pub fn unhost(&mut self, actor: ActorId, at: TimePoint, actors: &mut ActorStore) {
        self.roster.retain(|&a| a != actor);
        self.sched.remove(actor);
        self.publish(PlaceEvent::left(actor, at), actors);
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// Mirror `event` into the local scheduler for `actor`.
    ///
    /// Admissibility contract: the event may not end behind the local
    /// clock or behind the actor's own clock.
    pub fn reschedule(
        &mut self,
        actor: ActorId,
        event: &PlannedEvent,
    ) -> PlaceResult<Admission> {
        if event.end < self.encounter_time {
            return Err(CoreError::EventInPast {
                actor,
                end: event.end,
                now: self.encounter_time,
            }
            .into());
        }
        Ok(self.sched.schedule(ActorDue {
            actor,
            due: event.end,
            priority: event.priority,
        }))
    }

    /// Due time of the next thing this place must be woken for: its next
    /// live actor event or a pending ultimatum deadline, whichever is
    /// sooner.  This is what the world enrolls.
    pub fn next_due(&mut self) -> Option<TimePoint> {
        let event_due = self.sched.next_due();
        match (event_due, self.next_deadline.is_set()) {
            (Some(due), true) => Some(due.min(self.next_deadline)),
            (Some(due), false) => Some(due),
            (None, true) => Some(self.next_deadline),
            (None, false) => None,
        }
    }

    /// Number of live local events (audit).
    pub fn live_events(&self) -> usize {
        self.sched.live_len()
    }

    // ── Fan-out ───────────────────────────────────────────────────────────

    /// Publish a place event to every hosted actor's subscribed components,
    /// in roster order.  Handler failures are isolated inside
    /// [`Actor::handle_event`].
    pub fn publish(&self, event: PlaceEvent, actors: &mut ActorStore) {
        for &id in &self.roster {
            if let Some(actor) = actors.get_mut(id) {
                actor.handle_event(&event);
            }
        }
    }

    /// Sightings of everyone here except `observer`, roster order.
    pub fn sightings_for(&self, observer: ActorId, actors: &ActorStore) -> Vec<Sighting> {
        self.roster
            .iter()
            .filter(|&&id| id != observer)
            .filter_map(|&id| actors.get(id))
            .filter(|a| a.alive())
            .map(Actor::sighting)
            .collect()
    }
}
