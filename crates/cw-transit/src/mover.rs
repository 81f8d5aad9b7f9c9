//! Movers — actors currently on a road.

use cw_core::{ActorId, PlaceId, RoadId, TimeDuration, TimePoint};
use rustc_hash::FxHashMap;

use crate::error::{TransitError, TransitResult};
use crate::road::Road;

// ── Mover ─────────────────────────────────────────────────────────────────────

/// One actor's transit state.
///
/// `progress` is the position along the road at `departed`, in `[0, 1]`
/// measured from endpoint `a`.  Direction `+1` moves toward `b`, `-1`
/// toward `a`.  Position at any later instant is linear interpolation; the
/// arrival time is fixed at departure and scheduled in the world's transit
/// scheduler.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Mover {
    pub actor: ActorId,
    pub road: RoadId,
    pub progress: f64,
    pub direction: i8,
    pub departed: TimePoint,
    pub speed_kph: f64,
}

impl Mover {
    /// Start a crossing of `road` from `from` at `departed`.
    pub fn depart(
        actor: ActorId,
        road: &Road,
        from: PlaceId,
        departed: TimePoint,
        speed_kph: f64,
    ) -> TransitResult<Mover> {
        debug_assert!(speed_kph > 0.0);
        let direction = if from == road.a {
            1
        } else if from == road.b {
            -1
        } else {
            return Err(TransitError::NoRoad { a: from, b: from });
        };
        Ok(Mover {
            actor,
            road: road.id,
            progress: if direction == 1 { 0.0 } else { 1.0 },
            direction,
            departed,
            speed_kph,
        })
    }

    /// Resume a crossing from mid-road (departing an ephemeral transit
    /// stop), heading `toward` one of the road's endpoints.
    pub fn resume(
        actor: ActorId,
        road: &Road,
        progress: f64,
        toward: PlaceId,
        departed: TimePoint,
        speed_kph: f64,
    ) -> TransitResult<Mover> {
        debug_assert!((0.0..=1.0).contains(&progress));
        debug_assert!(speed_kph > 0.0);
        let direction = if toward == road.b {
            1
        } else if toward == road.a {
            -1
        } else {
            return Err(TransitError::NoRoad { a: toward, b: toward });
        };
        Ok(Mover {
            actor,
            road: road.id,
            progress,
            direction,
            departed,
            speed_kph,
        })
    }

    /// The place this mover is heading to.
    pub fn destination(&self, road: &Road) -> PlaceId {
        if self.direction == 1 {
            road.b
        } else {
            road.a
        }
    }

    /// Progress at `t`, clamped to `[0, 1]`.
    pub fn progress_at(&self, t: TimePoint, road: &Road) -> f64 {
        let hours = (t - self.departed).as_hours_f64();
        let delta = self.speed_kph * hours / road.length_km * self.direction as f64;
        (self.progress + delta).clamp(0.0, 1.0)
    }

    /// When this mover reaches the far end.
    pub fn arrival_time(&self, road: &Road) -> TimePoint {
        let remaining_km = if self.direction == 1 {
            (1.0 - self.progress) * road.length_km
        } else {
            self.progress * road.length_km
        };
        let secs = (remaining_km / self.speed_kph * 3_600.0).ceil() as i64;
        self.departed + TimeDuration::secs(secs)
    }
}

// ── TransitRegistry ───────────────────────────────────────────────────────────

/// All movers, indexed by actor and by road.
///
/// The per-road index keeps insertion order; contact detection iterates it
/// pairwise and its output order must be replayable.
#[derive(Default)]
pub struct TransitRegistry {
    movers: FxHashMap<ActorId, Mover>,
    by_road: FxHashMap<RoadId, Vec<ActorId>>,
}

impl TransitRegistry {
    pub fn new() -> Self {
        TransitRegistry::default()
    }

    /// Register a mover.  An actor can only be on one road at a time.
    pub fn insert(&mut self, mover: Mover) -> TransitResult<()> {
        if self.movers.contains_key(&mover.actor) {
            return Err(TransitError::AlreadyInTransit(mover.actor));
        }
        self.by_road.entry(mover.road).or_default().push(mover.actor);
        self.movers.insert(mover.actor, mover);
        Ok(())
    }

    /// Remove an actor's transit state (arrival, death).
    pub fn remove(&mut self, actor: ActorId) -> TransitResult<Mover> {
        let mover = self
            .movers
            .remove(&actor)
            .ok_or(TransitError::NotInTransit(actor))?;
        if let Some(on_road) = self.by_road.get_mut(&mover.road) {
            on_road.retain(|&a| a != actor);
            if on_road.is_empty() {
                self.by_road.remove(&mover.road);
            }
        }
        Ok(mover)
    }

    pub fn get(&self, actor: ActorId) -> Option<&Mover> {
        self.movers.get(&actor)
    }

    pub fn get_mut(&mut self, actor: ActorId) -> Option<&mut Mover> {
        self.movers.get_mut(&actor)
    }

    /// Actors on `road`, in registration order.
    pub fn on_road(&self, road: RoadId) -> &[ActorId] {
        self.by_road.get(&road).map_or(&[], Vec::as_slice)
    }

    pub fn is_in_transit(&self, actor: ActorId) -> bool {
        self.movers.contains_key(&actor)
    }

    pub fn len(&self) -> usize {
        self.movers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, &Mover)> {
        self.movers.iter()
    }
}
