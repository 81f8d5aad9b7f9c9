//! The component bus: pluggable per-actor behaviors.
//!
//! # Design
//!
//! Components are a closed tagged set with a shared switched interface
//! (priority, subscriptions, handle, plan, interaction enumeration) — no
//! trait objects, no open registry.  An actor's components are kept sorted
//! by descending priority; planning asks each in turn and the first
//! proposal wins (lower-priority components whose proposals never get asked
//! receive no notification).
//!
//! Component state is runtime-only.  It is *not* serialized: on restore,
//! components are rebuilt from the actor's role and re-subscribe, so
//! anything stored here must be reconstructible or safe to lose.

use cw_core::{ActorId, PlaceEvent, PlaceEventKind, PlaceId, PlaceKind, RoadId, TimeDuration, TimePoint};

use crate::actor::Actor;
use crate::bag::Commodity;
use crate::error::ActorResult;
use crate::event::{EventAction, PlannedEvent};
use crate::relation::ProposalSpec;

// ── Planning context ──────────────────────────────────────────────────────────

/// A road leading out of the current place.
#[derive(Copy, Clone, Debug)]
pub struct RoadExit {
    pub road: RoadId,
    pub to: PlaceId,
    pub length_km: f64,
}

/// A read-only glimpse of a co-located actor.
#[derive(Clone, Debug)]
pub struct Sighting {
    pub id: ActorId,
    /// Effective offense rating — how dangerous they look.
    pub menace: i32,
    /// Visible working stock (supplies, not cargo).
    pub stock: [i64; Commodity::COUNT],
}

impl Sighting {
    #[inline]
    pub fn stock_of(&self, c: Commodity) -> i64 {
        self.stock[c.index()]
    }

    /// The commodity they hold the most of.
    pub fn deepest_stock(&self) -> (Commodity, i64) {
        let mut best = (Commodity::Fuel, i64::MIN);
        for c in Commodity::ALL {
            if self.stock_of(c) > best.1 {
                best = (c, self.stock_of(c));
            }
        }
        best
    }
}

/// Everything a planner may look at beyond its own actor.
///
/// Assembled by the place for each planning sweep; borrowed, never stored.
pub struct PlanCtx<'a> {
    /// The place's encounter time — "now" for every proposal.
    pub now: TimePoint,
    pub place: PlaceId,
    pub kind: PlaceKind,
    pub wealth: f32,
    pub neighbors: &'a [RoadExit],
    /// Co-located actors in roster order, excluding the planner.
    pub others: &'a [Sighting],
}

impl<'a> PlanCtx<'a> {
    pub fn sighting(&self, id: ActorId) -> Option<&Sighting> {
        self.others.iter().find(|s| s.id == id)
    }
}

// ── Component kinds ───────────────────────────────────────────────────────────

/// Picks fights: presses ultimatums on weaker neighbors, strikes hostiles.
#[derive(Clone, Debug)]
pub struct Raider {
    /// Probability per planning sweep of pressing a fresh ultimatum.
    pub aggression: f32,
    /// Most recent hostile seen arriving, if any.
    pub grudge: Option<ActorId>,
}

/// Proposes value-balanced barters with co-located actors.
#[derive(Clone, Debug)]
pub struct Trader {
    /// Scales how much of a surplus the trader is willing to move at once.
    pub greed: f32,
    /// Most recent arrival — preferred as the next partner.
    pub fresh: Option<ActorId>,
}

/// Moves on after dwelling: departs via a random road.
#[derive(Clone, Debug)]
pub struct Nomad {
    pub wanderlust: f32,
    /// When the owner arrived at the current place; UNSET while in transit.
    pub arrived_at: TimePoint,
}

/// Fallback: always produces an idle wake so the actor never stalls.
#[derive(Clone, Debug)]
pub struct Idler {
    pub retry: TimeDuration,
}

/// A per-actor behavior.  See the module docs for the dispatch model.
#[derive(Clone, Debug)]
pub enum Component {
    Raider(Raider),
    Trader(Trader),
    Nomad(Nomad),
    Idler(Idler),
}

// Event priorities.  An exchange's busy event must preempt a standing idle,
// and a strike must preempt everything below it.
const PRI_STRIKE: i32 = 20;
const PRI_PRESS: i32 = 10;
const PRI_TRADE: i32 = 5;
const PRI_DEPART: i32 = 1;
const PRI_IDLE: i32 = 0;

impl Component {
    pub fn raider(aggression: f32) -> Self {
        Component::Raider(Raider {
            aggression,
            grudge: None,
        })
    }

    pub fn trader(greed: f32) -> Self {
        Component::Trader(Trader { greed, fresh: None })
    }

    pub fn nomad(wanderlust: f32) -> Self {
        Component::Nomad(Nomad {
            wanderlust,
            arrived_at: TimePoint::UNSET,
        })
    }

    pub fn idler(retry: TimeDuration) -> Self {
        Component::Idler(Idler { retry })
    }

    /// Static planning priority: higher plans first.
    pub fn priority(&self) -> i32 {
        match self {
            Component::Raider(_) => 30,
            Component::Trader(_) => 20,
            Component::Nomad(_) => 10,
            Component::Idler(_) => 0,
        }
    }

    /// Place-event kinds this component wants delivered.
    pub fn subscriptions(&self) -> &'static [PlaceEventKind] {
        match self {
            Component::Raider(_) => &[PlaceEventKind::Arrived],
            Component::Trader(_) => &[PlaceEventKind::Arrived, PlaceEventKind::Left],
            Component::Nomad(_) => &[PlaceEventKind::Arrived, PlaceEventKind::Left],
            Component::Idler(_) => &[],
        }
    }

    #[inline]
    pub fn subscribes_to(&self, kind: PlaceEventKind) -> bool {
        self.subscriptions().contains(&kind)
    }

    /// React to a published place event.
    ///
    /// `actor` is the owner, with its component list temporarily detached.
    pub fn handle(&mut self, actor: &mut Actor, event: &PlaceEvent) -> ActorResult<()> {
        match self {
            Component::Raider(r) => {
                if event.kind == PlaceEventKind::Arrived {
                    if let Some(who) = event.actor {
                        if who != actor.id && actor.relation(who).is_some_and(|rel| rel.hostile) {
                            r.grudge = Some(who);
                        }
                    }
                }
            }
            Component::Trader(t) => match event.kind {
                PlaceEventKind::Arrived => {
                    if let Some(who) = event.actor {
                        if who != actor.id {
                            t.fresh = Some(who);
                        }
                    }
                }
                PlaceEventKind::Left => {
                    if t.fresh == event.actor {
                        t.fresh = None;
                    }
                }
                _ => {}
            },
            Component::Nomad(n) => {
                if event.actor == Some(actor.id) {
                    match event.kind {
                        PlaceEventKind::Arrived => n.arrived_at = event.time,
                        PlaceEventKind::Left => n.arrived_at = TimePoint::UNSET,
                        _ => {}
                    }
                }
            }
            Component::Idler(_) => {}
        }
        Ok(())
    }

    /// Propose the owner's next action, or pass.
    pub fn plan(&mut self, actor: &mut Actor, ctx: &PlanCtx<'_>) -> Option<PlannedEvent> {
        match self {
            Component::Raider(r) => plan_raider(r, actor, ctx),
            Component::Trader(t) => plan_trader(t, actor, ctx),
            Component::Nomad(n) => plan_nomad(n, actor, ctx),
            Component::Idler(i) => plan_idler(i, actor, ctx),
        }
    }

    /// Enumerate proposals this component could extend toward `subject`.
    ///
    /// Used to build the player's interaction menu and by the protocol
    /// layer; pure with respect to the owner.
    pub fn interactions(&self, actor: &Actor, subject: &Sighting) -> Vec<ProposalSpec> {
        match self {
            Component::Raider(_) => {
                if actor.offense_rating() > subject.menace {
                    vec![ProposalSpec::Ultimatum {
                        demand: (Commodity::Scrap, 50),
                    }]
                } else {
                    vec![]
                }
            }
            Component::Trader(_) => {
                let (give_c, give_have) = actor.deepest_supply();
                let (take_c, take_have) = subject.deepest_stock();
                if give_c != take_c && give_have >= 20 && take_have >= 20 {
                    let give_n = give_have / 4;
                    let take_n = balance_take(give_c, give_n, take_c).min(take_have);
                    if give_n > 0 && take_n > 0 {
                        return vec![ProposalSpec::Barter {
                            give: (give_c, give_n),
                            take: (take_c, take_n),
                        }];
                    }
                }
                vec![]
            }
            Component::Nomad(_) | Component::Idler(_) => vec![],
        }
    }
}

// ── Planners ──────────────────────────────────────────────────────────────────

/// Units of `take` worth roughly the same as `give_n` units of `give`.
fn balance_take(give: Commodity, give_n: i64, take: Commodity) -> i64 {
    ((give_n as f64 * give.base_value()) / take.base_value()).round() as i64
}

fn plan_raider(r: &mut Raider, actor: &mut Actor, ctx: &PlanCtx<'_>) -> Option<PlannedEvent> {
    if actor.offense_rating() == 0 {
        return None;
    }

    // Standing hostility toward someone present: strike.
    let hostile_here = ctx.others.iter().find(|s| {
        actor.relation(s.id).is_some_and(|rel| rel.hostile)
    });
    if let Some(target) = hostile_here {
        let windup = 30 + actor.rng.next_bounded(60) as i64;
        return Some(PlannedEvent::new(
            PRI_STRIKE,
            ctx.now,
            ctx.now + TimeDuration::secs(windup),
            EventAction::Strike { at: target.id },
        ));
    }

    // Otherwise, occasionally press a fresh ultimatum on a weaker mark.
    if !actor.rng.next_bool(r.aggression) {
        return None;
    }
    let own = actor.offense_rating();
    let mark = ctx.others.iter().find(|s| {
        s.menace < own
            && actor.relation(s.id).map_or(true, |rel| {
                !rel.deadline.is_set() && !rel.is_spared() && !rel.hostile
            })
    })?;
    let amount = 25 + actor.rng.next_bounded(76) as i64;
    Some(PlannedEvent::new(
        PRI_PRESS,
        ctx.now,
        ctx.now + TimeDuration::secs(30),
        EventAction::Press {
            at: mark.id,
            demand: (Commodity::Scrap, amount),
        },
    ))
}

fn plan_trader(t: &mut Trader, actor: &mut Actor, ctx: &PlanCtx<'_>) -> Option<PlannedEvent> {
    // Prefer the freshest arrival; fall back to anyone present.
    let partner = t
        .fresh
        .and_then(|id| ctx.sighting(id))
        .or_else(|| ctx.others.first())?;

    if actor.relation(partner.id).is_some_and(|rel| rel.hostile) {
        return None;
    }

    let (give_c, give_have) = actor.deepest_supply();
    let (take_c, take_have) = partner.deepest_stock();
    if give_c == take_c || give_have < 20 || take_have < 20 {
        return None;
    }

    let ceiling = ((give_have / 2) as f64 * t.greed.clamp(0.1, 1.0) as f64) as i64;
    if ceiling < 1 {
        return None;
    }
    let give_n = 1 + actor.rng.next_bounded(ceiling as u64) as i64;
    let take_n = balance_take(give_c, give_n, take_c).min(take_have);
    if take_n < 1 {
        return None;
    }

    Some(PlannedEvent::new(
        PRI_TRADE,
        ctx.now,
        ctx.now + TimeDuration::mins(1),
        EventAction::Trade {
            with: partner.id,
            give: (give_c, give_n),
            take: (take_c, take_n),
        },
    ))
}

fn plan_nomad(n: &mut Nomad, actor: &mut Actor, ctx: &PlanCtx<'_>) -> Option<PlannedEvent> {
    if ctx.neighbors.is_empty() {
        // Missing collaborator (no roads): pass, the idler will retry.
        return None;
    }
    if actor.supplies.qty(Commodity::Fuel) + actor.cargo.qty(Commodity::Fuel) < 1 {
        return None;
    }

    if !n.arrived_at.is_set() {
        n.arrived_at = ctx.now;
    }
    let dwell_secs = (21_600.0 / n.wanderlust.clamp(0.25, 4.0)) as i64;
    if (ctx.now - n.arrived_at).as_secs() < dwell_secs {
        return None;
    }

    let exit = cw_core::dist::choose(&mut actor.rng, ctx.neighbors)?;
    Some(PlannedEvent::new(
        PRI_DEPART,
        ctx.now,
        ctx.now + TimeDuration::mins(10),
        EventAction::Depart {
            road: exit.road,
            to: exit.to,
        },
    ))
}

fn plan_idler(i: &mut Idler, actor: &mut Actor, ctx: &PlanCtx<'_>) -> Option<PlannedEvent> {
    let jitter = actor.rng.next_bounded(300) as i64;
    Some(PlannedEvent::new(
        PRI_IDLE,
        ctx.now,
        ctx.now + i.retry + TimeDuration::secs(jitter),
        EventAction::Idle,
    ))
}
