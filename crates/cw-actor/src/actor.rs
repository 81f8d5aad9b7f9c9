//! The actor: identity, clocks, bags, relations, and the plan/step loop.

use cw_core::{
    ActorId, CoreError, Gaussian, PlaceEvent, PlaceId, RoadId, Rng, TimePoint,
};
use rustc_hash::FxHashMap;
use tracing::{error, warn};

use crate::bag::{Bag, Commodity};
use crate::component::{Component, PlanCtx, Sighting};
use crate::error::{ActorError, ActorResult};
use crate::event::PlannedEvent;
use crate::knowledge::PlaceKnowledge;
use crate::relation::Relation;
use crate::segment::{self, Segment, SegmentKind};

// ── Location & end states ─────────────────────────────────────────────────────

/// Where an actor currently is.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// Not yet admitted anywhere (construction, restore pass 1).
    Nowhere,
    At(PlaceId),
    OnRoad(RoadId),
}

/// Terminal per-actor states.  Once set, the actor's events are dropped and
/// its relations latch.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndState {
    Destroyed,
    Starved,
    Revolted,
}

// ── Actor ─────────────────────────────────────────────────────────────────────

/// A schedulable entity: crawler, settlement, or resource site.
///
/// # Clock invariants
///
/// - `time` is monotonically non-decreasing.
/// - At most one `next_event`, with `next_event.end >= time`.
/// - While hosted by a place, `next_event.end >=` that place's encounter
///   time (enforced on the admission path).
pub struct Actor {
    pub id: ActorId,
    /// Unique; the persistence layer resolves relations by name.
    pub name: String,
    /// Role key — selects the component recipe on spawn and on restore.
    pub role: String,
    pub location: Location,

    pub rng: Rng,
    pub gauss: Gaussian,

    /// The simulated instant this actor's state has been advanced to.
    pub time: TimePoint,
    /// The single outstanding planned action.
    pub next_event: Option<PlannedEvent>,

    /// Working stock, visible to co-located actors.
    pub supplies: Bag,
    /// Hold stock.  Supplies may overdraw from here; never the reverse.
    pub cargo: Bag,

    pub segments: Vec<Segment>,
    /// Sorted by descending priority; ties keep attach order.
    pub components: Vec<Component>,
    pub relations: FxHashMap<ActorId, Relation>,
    pub knowledge: FxHashMap<PlaceId, PlaceKnowledge>,

    pub end_state: Option<EndState>,
}

impl Actor {
    /// Create an actor whose clock starts at `now`.
    ///
    /// The Gaussian branches off the actor's stream by path, so normal
    /// draws never perturb the main stream.
    pub fn new(id: ActorId, name: impl Into<String>, role: impl Into<String>, rng: Rng, now: TimePoint) -> Self {
        let gauss = Gaussian::new(rng.derive("gauss"));
        Actor {
            id,
            name: name.into(),
            role: role.into(),
            location: Location::Nowhere,
            rng,
            gauss,
            time: now,
            next_event: None,
            supplies: Bag::new(),
            cargo: Bag::new(),
            segments: Vec::new(),
            components: Vec::new(),
            relations: FxHashMap::default(),
            knowledge: FxHashMap::default(),
            end_state: None,
        }
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.end_state.is_none()
    }

    /// Enter a terminal state: the outstanding event is dropped and the
    /// hosting layer is expected to publish `Left` and deschedule.
    pub fn end(&mut self, state: EndState) {
        error!(actor = %self.id, name = %self.name, ?state, "actor ended");
        self.end_state = Some(state);
        self.next_event = None;
    }

    // ── Components ────────────────────────────────────────────────────────

    /// Attach a component, keeping the list sorted by descending priority
    /// (stable: equal priorities keep attach order).
    pub fn attach(&mut self, component: Component) {
        self.components.push(component);
        self.components.sort_by_key(|c| std::cmp::Reverse(c.priority()));
    }

    /// Deliver a place event to every subscribed component.
    ///
    /// A failing handler is logged and isolated; the fan-out continues.
    pub fn handle_event(&mut self, event: &PlaceEvent) {
        let mut components = std::mem::take(&mut self.components);
        for component in components.iter_mut() {
            if !component.subscribes_to(event.kind) {
                continue;
            }
            if let Err(err) = component.handle(self, event) {
                warn!(actor = %self.id, kind = ?event.kind, %err, "component handler failed");
            }
        }
        self.components = components;
    }

    // ── Planning ──────────────────────────────────────────────────────────

    /// Ask components for the next action, highest priority first; the
    /// first proposal wins the sweep.
    pub fn plan_proposal(&mut self, ctx: &PlanCtx<'_>) -> Option<PlannedEvent> {
        let mut components = std::mem::take(&mut self.components);
        let mut picked = None;
        for component in components.iter_mut() {
            if let Some(event) = component.plan(self, ctx) {
                picked = Some(event);
                break;
            }
        }
        self.components = components;
        picked
    }

    /// Plan and admit in one step.  Returns the admitted event (a copy) if
    /// the proposal was accepted by [`set_next_event`][Self::set_next_event].
    pub fn replan(&mut self, ctx: &PlanCtx<'_>) -> ActorResult<Option<PlannedEvent>> {
        match self.plan_proposal(ctx) {
            None => Ok(None),
            Some(event) => {
                if self.set_next_event(event)? {
                    Ok(Some(event))
                } else {
                    Ok(None)
                }
            }
        }
    }

    // ── Event admission ───────────────────────────────────────────────────

    /// Admit `candidate` as the next event under the preemption discipline:
    /// no current event accepts; otherwise higher priority replaces, equal
    /// priority with earlier end replaces, anything else is dropped.
    ///
    /// Returns `Ok(true)` if the candidate is now the next event.  The
    /// hosting place must be told of acceptances so the change propagates
    /// upward.
    pub fn set_next_event(&mut self, candidate: PlannedEvent) -> ActorResult<bool> {
        if !self.alive() {
            return Err(ActorError::Ended(self.id));
        }
        if candidate.end < self.time {
            return Err(CoreError::EventInPast {
                actor: self.id,
                end: candidate.end,
                now: self.time,
            }
            .into());
        }
        let accept = match &self.next_event {
            None => true,
            Some(current) => {
                candidate.priority > current.priority
                    || (candidate.priority == current.priority && candidate.end < current.end)
            }
        };
        if accept {
            self.next_event = Some(candidate);
        }
        Ok(accept)
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    /// Advance the clock to `t`.  Errors on reversal.
    pub fn advance_to(&mut self, t: TimePoint) -> ActorResult<()> {
        if t < self.time {
            return Err(CoreError::TimeReversal {
                from: self.time,
                to: t,
            }
            .into());
        }
        self.time = t;
        Ok(())
    }

    /// Synchronize this actor's state forward to `t`.
    ///
    /// Marks an in-progress event's begin effect as consumed (it has been
    /// simulated through) and completes it if `end <= t`, returning the
    /// completed event so the caller can run its completion effect and
    /// trigger a re-plan.  Used by the exchange protocol's
    /// synchronize-to-max step; the place tick drives events through its
    /// own, richer path.
    pub fn simulate_to(&mut self, t: TimePoint) -> ActorResult<Option<PlannedEvent>> {
        if t < self.time {
            return Err(CoreError::TimeReversal {
                from: self.time,
                to: t,
            }
            .into());
        }
        let mut completed = None;
        if let Some(event) = self.next_event.as_mut() {
            if event.start <= t {
                event.pre_done = true;
            }
            if event.end <= t {
                completed = self.next_event.take();
            }
        }
        self.time = t;
        Ok(completed)
    }

    // ── Bags ──────────────────────────────────────────────────────────────

    /// Withdraw `n` units, draining supplies first and overdrawing the
    /// remainder from cargo.  The overdraw is one-way: nothing ever pulls
    /// from supplies to satisfy a cargo debit.
    pub fn withdraw(&mut self, c: Commodity, n: i64) -> ActorResult<()> {
        let from_supplies = n.min(self.supplies.qty(c));
        let from_cargo = n - from_supplies;
        if self.cargo.qty(c) < from_cargo {
            return Err(ActorError::Shortfall {
                commodity: c,
                need: n,
                have: self.supplies.qty(c) + self.cargo.qty(c),
            });
        }
        self.supplies.debit(c, from_supplies)?;
        self.cargo.debit(c, from_cargo)?;
        Ok(())
    }

    /// Combined holdings of one commodity.
    #[inline]
    pub fn holdings(&self, c: Commodity) -> i64 {
        self.supplies.qty(c) + self.cargo.qty(c)
    }

    /// The supply commodity held in greatest quantity.
    pub fn deepest_supply(&self) -> (Commodity, i64) {
        let mut best = (Commodity::Fuel, i64::MIN);
        for c in Commodity::ALL {
            if self.supplies.qty(c) > best.1 {
                best = (c, self.supplies.qty(c));
            }
        }
        best
    }

    // ── Segments ──────────────────────────────────────────────────────────

    pub fn offense_rating(&self) -> i32 {
        segment::rating_of(&self.segments, SegmentKind::Offense)
    }

    pub fn defense_rating(&self) -> i32 {
        segment::rating_of(&self.segments, SegmentKind::Defense)
    }

    /// Travel speed from traction segments; a crawler with no working
    /// traction limps at 1 km/h.
    pub fn speed_kph(&self) -> f64 {
        segment::rating_of(&self.segments, SegmentKind::Traction).max(1) as f64
    }

    /// `true` when every segment is wrecked.
    pub fn is_wrecked(&self) -> bool {
        !self.segments.is_empty() && segment::total_hits(&self.segments) == 0
    }

    // ── Relations ─────────────────────────────────────────────────────────

    pub fn relation(&self, other: ActorId) -> Option<&Relation> {
        self.relations.get(&other)
    }

    /// The outbound relation toward `other`, created on first touch.
    pub fn relation_mut(&mut self, other: ActorId) -> &mut Relation {
        self.relations.entry(other).or_insert_with(Relation::new)
    }

    /// This actor as others see it.
    pub fn sighting(&self) -> Sighting {
        let mut stock = [0i64; Commodity::COUNT];
        for c in Commodity::ALL {
            stock[c.index()] = self.supplies.qty(c);
        }
        Sighting {
            id: self.id,
            menace: self.offense_rating(),
            stock,
        }
    }
}
